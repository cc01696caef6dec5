//! A chat thread's message list: windowing, detail loading, viewport fill and
//! live id updates for one open thread at a time.

use log::{debug, info, trace};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::cache::RecordSource;
use crate::error::ViewError;
use crate::events::{EventBus, ViewEvent};
use crate::index::{IdList, MessageIdIndex};
use threadcore::{
    Advance, BlockList, FillDecision, FillGuard, FillProbe, Generation, ListConfig, ListSnapshot,
    MessageId, ThreadId, WindowController,
};

pub(crate) struct ViewState {
    pub(crate) ctrl: WindowController,
    fill: FillGuard,
    blocked: BlockList,
    last_read: Option<MessageId>,
    /// Live id follower for the current generation. Swapped under the same
    /// lock as the controller so it always matches the open thread.
    follower: Option<JoinHandle<()>>,
}

pub(crate) fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    // State stays consistent across a panicking holder; every mutation is a
    // single controller call.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ThreadView {
    pub(crate) config: ListConfig,
    index: Arc<dyn MessageIdIndex>,
    pub(crate) cache: Arc<dyn RecordSource>,
    pub(crate) state: Arc<Mutex<ViewState>>,
    /// Last scroll-to-message ticket handed out.
    pub(crate) tickets: AtomicU64,
    pub(crate) events: EventBus,
    /// Bumped on every new search and thread switch to wake waiting searches.
    pub(crate) interrupts: watch::Sender<u64>,
}

impl ThreadView {
    pub fn new(config: ListConfig, index: Arc<dyn MessageIdIndex>, cache: Arc<dyn RecordSource>) -> Self {
        config.validate();
        let state = ViewState {
            ctrl: WindowController::new(config.page_size, config.anchor),
            fill: FillGuard::new(config.fill_slack),
            blocked: BlockList::default(),
            last_read: None,
            follower: None,
        };
        Self {
            config,
            index,
            cache,
            state: Arc::new(Mutex::new(state)),
            tickets: AtomicU64::new(0),
            events: EventBus::new(),
            interrupts: watch::channel(0).0,
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Opens a thread and starts following its ids. Switching to another
    /// thread resets the window and cancels interest in the previous one.
    pub async fn open(&self, thread: ThreadId) -> Result<Generation, ViewError> {
        let mut rx = self.index.subscribe(&thread).await?;
        let ids = rx.borrow_and_update().clone();

        let (generation, switched) = {
            let mut st = lock(&self.state);
            let before = st.ctrl.generation();
            let generation = st.ctrl.open(thread.clone(), ids);
            let switched = generation != before;
            if switched {
                st.fill.reset();
                st.last_read = None;
            }
            let task = tokio::spawn(follow_ids(
                Arc::clone(&self.state),
                self.events.clone(),
                rx,
                generation,
            ));
            if let Some(previous) = st.follower.replace(task) {
                previous.abort();
            }
            (generation, switched)
        };

        if switched {
            info!(target: "ThreadView", "Opened thread {thread} (generation {generation})");
            self.interrupt_searches();
            self.events.dispatch(ViewEvent::ThreadOpened { thread, generation });
        }
        Ok(generation)
    }

    /// Stops following the open thread's ids.
    pub fn close(&self) {
        if let Some(task) = lock(&self.state).follower.take() {
            task.abort();
        }
    }

    pub fn thread(&self) -> Option<ThreadId> {
        lock(&self.state).ctrl.thread().cloned()
    }

    pub fn generation(&self) -> Generation {
        lock(&self.state).ctrl.generation()
    }

    pub fn window_len(&self) -> usize {
        lock(&self.state).ctrl.window_len()
    }

    pub fn is_paused(&self) -> bool {
        lock(&self.state).ctrl.is_paused()
    }

    pub fn set_blocked(&self, blocked: BlockList) {
        lock(&self.state).blocked = blocked;
    }

    pub fn set_last_read(&self, id: Option<MessageId>) {
        lock(&self.state).last_read = id;
    }

    /// The virtual list's `loadMore`. Ignored while a search holds the pause.
    pub fn load_more(&self) -> Advance {
        let (advance, generation) = {
            let mut st = lock(&self.state);
            (st.ctrl.request_more(), st.ctrl.generation())
        };
        self.report_growth(advance, generation);
        advance
    }

    /// Called on scroll with the distance between the viewport and the loaded
    /// edge. Returns `None` when still outside the threshold.
    pub fn on_scroll(&self, distance_from_edge: f32) -> Option<Advance> {
        if distance_from_edge > self.config.scroll_threshold {
            return None;
        }
        Some(self.load_more())
    }

    /// Called after each render with the measured heights. Grows the window
    /// when the content can't fill the viewport yet. Starts fetches for the
    /// windowed ids, so a grown page loads even if no snapshot is taken.
    pub fn on_layout(&self, content_height: f32, viewport_height: f32) -> FillDecision {
        let (decision, advance, generation) = {
            let mut st = lock(&self.state);
            if st.ctrl.is_paused() {
                return FillDecision::Waiting;
            }
            let visible: Vec<MessageId> = st.blocked.filter(st.ctrl.window_ids()).cloned().collect();
            let pending = self
                .cache
                .request(&visible)
                .values()
                .filter(|state| state.is_loading())
                .count();
            let probe = FillProbe {
                content_height,
                viewport_height,
                window_len: st.ctrl.window_len(),
                pending,
                has_more: st.ctrl.has_more(),
            };
            let decision = st.fill.check(probe);
            let advance = (decision == FillDecision::Fill).then(|| st.ctrl.request_more());
            (decision, advance, st.ctrl.generation())
        };
        if let Some(advance) = advance {
            debug!(target: "ThreadView/Fill", "Viewport not full, loading more: {advance:?}");
            self.report_growth(advance, generation);
        }
        decision
    }

    /// Current list contents. Starts fetches for every windowed id that
    /// hasn't been requested yet.
    pub fn snapshot(&self) -> ListSnapshot {
        let st = lock(&self.state);
        let visible: Vec<MessageId> = st.blocked.filter(st.ctrl.window_ids()).cloned().collect();
        let records = self.cache.request(&visible);
        ListSnapshot::build(
            &st.ctrl,
            &st.blocked,
            st.last_read.as_ref(),
            self.config.scroll_threshold,
            |id| records.get(id).cloned().unwrap_or_else(|| self.cache.get(id)),
        )
    }

    fn report_growth(&self, advance: Advance, generation: Generation) {
        if let Advance::Grew { from, to } = advance {
            self.events.dispatch(ViewEvent::WindowGrew {
                generation,
                from,
                to,
            });
        }
    }

    pub(crate) fn interrupt_searches(&self) {
        self.interrupts.send_modify(|n| *n = n.wrapping_add(1));
    }
}

impl Drop for ThreadView {
    fn drop(&mut self) {
        self.close();
    }
}

/// Applies live id updates for one generation, exiting once a different
/// thread is open or the feed closes.
async fn follow_ids(
    state: Arc<Mutex<ViewState>>,
    events: EventBus,
    mut rx: watch::Receiver<IdList>,
    generation: Generation,
) {
    while rx.changed().await.is_ok() {
        let ids = rx.borrow_and_update().clone();
        let total = ids.len();
        let applied = lock(&state).ctrl.sync_ids(generation, ids);
        match applied {
            Ok(()) => {
                trace!(target: "ThreadView", "Thread ids updated, {total} total");
                events.dispatch(ViewEvent::IdsUpdated { generation, total });
            }
            Err(e) => {
                debug!(target: "ThreadView", "Dropping id update: {e}");
                return;
            }
        }
    }
    debug!(target: "ThreadView", "Id feed for generation {generation} closed");
}
