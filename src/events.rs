use tokio::sync::broadcast;

use threadcore::{Generation, MessageId, ThreadId};

// The size of the broadcast channel buffer.
const CHANNEL_CAPACITY: usize = 100;

/// Everything a rendering layer reacts to. Each event carries the generation
/// it was produced in, so a renderer can ignore events from a thread it has
/// already left.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ThreadOpened {
        thread: ThreadId,
        generation: Generation,
    },
    IdsUpdated {
        generation: Generation,
        total: usize,
    },
    WindowGrew {
        generation: Generation,
        from: usize,
        to: usize,
    },
    /// Scroll the row with this id into view.
    ScrollIntoView {
        generation: Generation,
        id: MessageId,
    },
    Highlight {
        generation: Generation,
        id: MessageId,
    },
    /// A scroll-to-message target isn't in the thread.
    NotFound {
        generation: Generation,
        id: MessageId,
    },
}

#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<ViewEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }

    /// Sends to current subscribers; having none is fine.
    pub fn dispatch(&self, event: ViewEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}
