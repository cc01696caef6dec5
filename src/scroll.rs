use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::events::ViewEvent;
use crate::view::{ThreadView, lock};
use threadcore::{Generation, MessageId, RecordState, ScrollSearch, SearchStep, SearchTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Scrolled to and highlighted the message.
    Found(MessageId),
    /// The whole thread was windowed without finding the id.
    NotFound,
    /// The message is in the thread but its record failed to load.
    Unavailable,
    /// The record didn't settle in time.
    TimedOut,
    /// A newer request or a thread switch took over.
    Superseded,
}

impl ThreadView {
    /// Brings a possibly unloaded message into view. Pauses the list's own
    /// loading while it grows the window; the latest request always wins.
    pub async fn scroll_to_message(&self, target: MessageId) -> ScrollOutcome {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        self.interrupt_searches();
        let mut interrupted = self.interrupts.subscribe();
        let generation = {
            let mut st = lock(&self.state);
            if st.ctrl.thread().is_none() {
                return ScrollOutcome::NotFound;
            }
            st.ctrl.pause(ticket);
            st.ctrl.generation()
        };

        // Released on every exit, including when this future is dropped.
        let state = Arc::clone(&self.state);
        let _pause = scopeguard::guard((), move |_| {
            lock(&state).ctrl.resume(ticket);
        });

        debug!(target: "ThreadView/Search", "Search #{ticket} for {target} started");
        let mut search = ScrollSearch::new(target.clone());
        loop {
            if self.tickets.load(Ordering::SeqCst) != ticket {
                debug!(target: "ThreadView/Search", "Search #{ticket} superseded by a newer request");
                return ScrollOutcome::Superseded;
            }

            let step = {
                let mut st = lock(&self.state);
                if st.ctrl.generation() != generation {
                    debug!(target: "ThreadView/Search", "Search #{ticket} dropped, thread changed");
                    return ScrollOutcome::Superseded;
                }
                search.step(&mut st.ctrl, |id| self.cache.get(id))
            };

            match step {
                SearchStep::Found => {
                    info!(
                        target: "ThreadView/Search",
                        "Found {target} after {} advances",
                        search.advances()
                    );
                    self.events.dispatch(ViewEvent::ScrollIntoView {
                        generation,
                        id: target.clone(),
                    });
                    self.events.dispatch(ViewEvent::Highlight {
                        generation,
                        id: target.clone(),
                    });
                    return ScrollOutcome::Found(target);
                }
                SearchStep::Advanced { from, to } => {
                    self.events.dispatch(ViewEvent::WindowGrew {
                        generation,
                        from,
                        to,
                    });
                    // Let renders and fetches run between pages.
                    tokio::task::yield_now().await;
                }
                SearchStep::Waiting => {
                    let mut rx = self.cache.subscribe(&target);
                    // A newer request or a thread switch wakes the wait; the
                    // checks at the top of the loop then end this search.
                    let settled = tokio::select! {
                        waited = tokio::time::timeout(
                            self.config.resolve_timeout(),
                            rx.wait_for(RecordState::is_settled),
                        ) => waited.map(|waited| waited.map(|_| ())),
                        _ = interrupted.changed() => continue,
                    };
                    if self.is_stale(ticket, generation) {
                        debug!(target: "ThreadView/Search", "Search #{ticket} went stale while waiting");
                        return ScrollOutcome::Superseded;
                    }
                    match settled {
                        Ok(Ok(_)) => {}
                        Ok(Err(_)) => return ScrollOutcome::Unavailable,
                        Err(_) => {
                            warn!(target: "ThreadView/Search", "Timed out waiting for {target}");
                            return ScrollOutcome::TimedOut;
                        }
                    }
                }
                SearchStep::Unavailable => {
                    debug!(target: "ThreadView/Search", "{target} failed to load");
                    return ScrollOutcome::Unavailable;
                }
                SearchStep::Exhausted => {
                    info!(target: "ThreadView/Search", "{target} is not in this thread");
                    self.events.dispatch(ViewEvent::NotFound {
                        generation,
                        id: target,
                    });
                    return ScrollOutcome::NotFound;
                }
            }
        }
    }

    fn is_stale(&self, ticket: SearchTicket, generation: Generation) -> bool {
        self.tickets.load(Ordering::SeqCst) != ticket || lock(&self.state).ctrl.generation() != generation
    }

    /// Jumps to the configured pinned message.
    pub async fn scroll_to_pinned(&self) -> ScrollOutcome {
        match self.config.pinned_message.clone() {
            Some(id) => self.scroll_to_message(id).await,
            None => ScrollOutcome::NotFound,
        }
    }

    /// Jumps to the message that `id` replies to.
    pub async fn scroll_to_reply_of(&self, id: &MessageId) -> ScrollOutcome {
        let target = self
            .cache
            .get(id)
            .record()
            .and_then(|record| record.reply_to.clone());
        match target {
            Some(target) => self.scroll_to_message(target).await,
            None => ScrollOutcome::NotFound,
        }
    }
}
