//! Live, ordered message-id feed per thread.
//!
//! Updates only append or prepend; existing ids never move.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::debug;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::IndexError;
use threadcore::{MessageId, ThreadId};

pub type IdList = Arc<[MessageId]>;

#[async_trait]
pub trait MessageIdIndex: Send + Sync {
    /// Subscribes to a thread's ids. The receiver holds the current list and
    /// is notified on every update.
    async fn subscribe(&self, thread: &ThreadId) -> Result<watch::Receiver<IdList>, IndexError>;
}

/// In-process index, oldest id first.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    threads: DashMap<ThreadId, watch::Sender<IdList>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or replaces a thread's id list.
    pub fn seed(&self, thread: ThreadId, ids: impl IntoIterator<Item = MessageId>) {
        let ids: IdList = ids.into_iter().collect();
        match self.threads.entry(thread) {
            Entry::Occupied(entry) => {
                entry.get().send_replace(ids);
            }
            Entry::Vacant(entry) => {
                entry.insert(watch::channel(ids).0);
            }
        }
    }

    pub fn append(&self, thread: &ThreadId, id: MessageId) -> Result<(), IndexError> {
        self.update(thread, |ids| {
            let mut next = ids.to_vec();
            next.push(id);
            next.into()
        })
    }

    pub fn prepend(&self, thread: &ThreadId, id: MessageId) -> Result<(), IndexError> {
        self.update(thread, |ids| {
            let mut next = Vec::with_capacity(ids.len() + 1);
            next.push(id);
            next.extend_from_slice(ids);
            next.into()
        })
    }

    pub fn len(&self, thread: &ThreadId) -> Option<usize> {
        self.threads.get(thread).map(|tx| tx.borrow().len())
    }

    fn update(&self, thread: &ThreadId, f: impl FnOnce(&[MessageId]) -> IdList) -> Result<(), IndexError> {
        let tx = self
            .threads
            .get(thread)
            .ok_or_else(|| IndexError::UnknownThread(thread.clone()))?;
        tx.send_modify(|ids| *ids = f(ids));
        debug!(target: "Index", "Thread {thread} now has {} ids", tx.borrow().len());
        Ok(())
    }
}

#[async_trait]
impl MessageIdIndex for MemoryIndex {
    async fn subscribe(&self, thread: &ThreadId) -> Result<watch::Receiver<IdList>, IndexError> {
        self.threads
            .get(thread)
            .map(|tx| tx.subscribe())
            .ok_or_else(|| IndexError::UnknownThread(thread.clone()))
    }
}
