//! Single owner of a view's window, id list, thread identity and pause flag.
//!
//! Growth goes through [`WindowController::advance`] (search) or
//! [`WindowController::request_more`] (list edge and viewport fill). The pause
//! is held by a search ticket so an older search can never release a newer
//! search's pause.

use log::{debug, trace};
use std::sync::Arc;

use crate::error::WindowError;
use crate::types::{MessageId, ThreadId};
use crate::window::{Anchor, Window};

/// Bumped every time a different thread is opened. Async continuations compare
/// it before applying their effects.
pub type Generation = u64;

/// Identifies one scroll-to-message request. Later requests get larger tickets.
pub type SearchTicket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Grew { from: usize, to: usize },
    /// The window already covers every id.
    Exhausted,
    /// Auto-growth is suppressed while a search holds the pause.
    Paused,
}

#[derive(Debug)]
pub struct WindowController {
    page_size: usize,
    anchor: Anchor,
    thread: Option<ThreadId>,
    generation: Generation,
    ids: Arc<[MessageId]>,
    window: Window,
    paused_by: Option<SearchTicket>,
}

impl WindowController {
    pub fn new(page_size: usize, anchor: Anchor) -> Self {
        Self {
            page_size,
            anchor,
            thread: None,
            generation: 0,
            ids: Arc::from(Vec::new()),
            window: Window::empty(page_size, anchor),
            paused_by: None,
        }
    }

    /// Opens `thread`. A different thread resets the window to one page, drops
    /// any pause and starts a new generation; the same thread only takes the
    /// new ids.
    pub fn open(&mut self, thread: ThreadId, ids: Arc<[MessageId]>) -> Generation {
        if self.thread.as_ref() == Some(&thread) {
            self.ids = ids;
            return self.generation;
        }

        self.generation += 1;
        debug!(
            target: "Window",
            "Opening thread {thread} ({} ids), generation {}",
            ids.len(),
            self.generation
        );
        self.thread = Some(thread);
        self.ids = ids;
        self.window = Window::reset(self.page_size, self.anchor);
        self.paused_by = None;
        self.generation
    }

    /// Applies a live update of the id list. Never resets the window.
    pub fn sync_ids(&mut self, generation: Generation, ids: Arc<[MessageId]>) -> Result<(), WindowError> {
        if self.thread.is_none() {
            return Err(WindowError::NoThread);
        }
        if generation != self.generation {
            return Err(WindowError::StaleGeneration {
                got: generation,
                current: self.generation,
            });
        }
        trace!(target: "Window", "Synced {} ids (was {})", ids.len(), self.ids.len());
        self.ids = ids;
        Ok(())
    }

    pub fn advance(&mut self) -> Advance {
        let total = self.ids.len();
        let from = self.window.len(total);
        if self.window.advance(total) {
            let to = self.window.len(total);
            trace!(target: "Window", "Advanced window {from} -> {to} of {total}");
            Advance::Grew { from, to }
        } else {
            Advance::Exhausted
        }
    }

    /// Growth requested by the list itself. Suppressed while paused.
    pub fn request_more(&mut self) -> Advance {
        if let Some(ticket) = self.paused_by {
            trace!(target: "Window", "Load more ignored, paused by search #{ticket}");
            return Advance::Paused;
        }
        self.advance()
    }

    /// Takes the pause for `ticket`, replacing any older holder.
    ///
    /// For a holder whose hold spans awaits, such as the async scroll search
    /// that keeps the controller behind a lock between steps. It must pair
    /// this with [`WindowController::resume`] on every exit. Synchronous
    /// callers use [`WindowController::with_paused`] instead.
    pub fn pause(&mut self, ticket: SearchTicket) {
        self.paused_by = Some(ticket);
    }

    /// Releases the pause if `ticket` still holds it. Returns whether it did.
    pub fn resume(&mut self, ticket: SearchTicket) -> bool {
        if self.paused_by == Some(ticket) {
            self.paused_by = None;
            true
        } else {
            false
        }
    }

    /// Runs `f` with the pause held by `ticket`, then hands the pause back to
    /// whoever held it before.
    pub fn with_paused<R>(&mut self, ticket: SearchTicket, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.paused_by.replace(ticket);
        let out = f(self);
        if self.paused_by == Some(ticket) {
            self.paused_by = previous;
        }
        out
    }

    pub fn is_paused(&self) -> bool {
        self.paused_by.is_some()
    }

    pub fn thread(&self) -> Option<&ThreadId> {
        self.thread.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn ids(&self) -> &Arc<[MessageId]> {
        &self.ids
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_ids(&self) -> &[MessageId] {
        self.window.slice(&self.ids)
    }

    pub fn window_len(&self) -> usize {
        self.window.len(self.ids.len())
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more(self.ids.len())
    }

    pub fn in_window(&self, id: &MessageId) -> bool {
        self.window.contains(&self.ids, id)
    }
}
