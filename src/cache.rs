//! Shared, id-keyed record cache.
//!
//! Every component reads through [`RecordSource`]; only fetch completions and
//! [`QueryCache::insert`] write. Concurrent requests for one id share a single
//! fetch. Each entry remembers which fetch it is waiting for, so a superseded
//! fetch (after `insert` or `invalidate`) cannot overwrite a newer state.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::join_all;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::error::FetchError;
use threadcore::{MessageId, MessageRecord, RecordMap, RecordState};

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, id: &MessageId) -> Result<MessageRecord, FetchError>;
}

/// Read side of the cache, as seen by views.
pub trait RecordSource: Send + Sync {
    /// Current state without starting a fetch. Ids never requested read as `Loading`.
    fn get(&self, id: &MessageId) -> RecordState;

    /// Watches one id, starting its fetch if nobody has yet.
    fn subscribe(&self, id: &MessageId) -> watch::Receiver<RecordState>;

    /// Batched form of `subscribe` returning the current states.
    fn request(&self, ids: &[MessageId]) -> RecordMap {
        ids.iter()
            .map(|id| (id.clone(), self.subscribe(id).borrow().clone()))
            .collect()
    }
}

#[derive(Debug)]
struct CacheEntry {
    tx: watch::Sender<RecordState>,
    /// Fetch whose result this entry accepts; 0 when none is in flight.
    fetch: u64,
}

pub struct QueryCache {
    entries: Arc<DashMap<MessageId, CacheEntry>>,
    fetcher: Arc<dyn RecordFetcher>,
    fetch_seq: AtomicU64,
    runtime: Handle,
}

impl QueryCache {
    /// Must be called from within a tokio runtime; fetches run on it.
    pub fn new(fetcher: Arc<dyn RecordFetcher>) -> Self {
        Self::with_runtime(fetcher, Handle::current())
    }

    pub fn with_runtime(fetcher: Arc<dyn RecordFetcher>, runtime: Handle) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            fetcher,
            fetch_seq: AtomicU64::new(0),
            runtime,
        }
    }

    /// Stores a record from the originating write path (e.g. a sent message).
    pub fn insert(&self, record: MessageRecord) {
        let state = RecordState::Resolved(Arc::new(record.clone()));
        match self.entries.entry(record.id) {
            Entry::Occupied(mut entry) => {
                let entry = entry.get_mut();
                entry.fetch = 0;
                entry.tx.send_replace(state);
            }
            Entry::Vacant(entry) => {
                entry.insert(CacheEntry {
                    tx: watch::channel(state).0,
                    fetch: 0,
                });
            }
        }
    }

    /// Refetches an id in place. Subscribers see `Loading` then the new result.
    pub fn invalidate(&self, id: &MessageId) {
        let Some(mut entry) = self.entries.get_mut(id) else {
            return;
        };
        let fetch = self.next_fetch();
        entry.fetch = fetch;
        entry.tx.send_replace(RecordState::Loading);
        drop(entry);
        self.spawn_fetch(id.clone(), fetch);
    }

    /// Drops an id. Open subscriptions end; the next subscribe refetches.
    pub fn evict(&self, id: &MessageId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Waits until the id's fetch has settled.
    pub async fn resolved(&self, id: &MessageId) -> RecordState {
        let mut rx = self.subscribe(id);
        match rx.wait_for(RecordState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => RecordState::Failed("evicted".to_string()),
        }
    }

    /// Waits for every id concurrently.
    pub async fn resolve_all(&self, ids: &[MessageId]) -> RecordMap {
        let states = join_all(ids.iter().map(|id| self.resolved(id))).await;
        ids.iter().cloned().zip(states).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn spawn_fetch(&self, id: MessageId, fetch: u64) {
        let entries = Arc::clone(&self.entries);
        let fetcher = Arc::clone(&self.fetcher);
        self.runtime.spawn(async move {
            let state = match fetcher.fetch(&id).await {
                Ok(record) => RecordState::Resolved(Arc::new(record)),
                Err(e) => {
                    warn!(target: "Cache", "Fetch of {id} failed: {e}");
                    RecordState::Failed(e.to_string())
                }
            };
            match entries.get_mut(&id) {
                Some(mut entry) if entry.fetch == fetch => {
                    entry.fetch = 0;
                    entry.tx.send_replace(state);
                }
                _ => debug!(target: "Cache", "Discarding superseded fetch #{fetch} of {id}"),
            }
        });
    }
}

impl RecordSource for QueryCache {
    fn get(&self, id: &MessageId) -> RecordState {
        self.entries
            .get(id)
            .map(|entry| entry.tx.borrow().clone())
            .unwrap_or(RecordState::Loading)
    }

    fn subscribe(&self, id: &MessageId) -> watch::Receiver<RecordState> {
        match self.entries.entry(id.clone()) {
            Entry::Occupied(entry) => entry.get().tx.subscribe(),
            Entry::Vacant(entry) => {
                let fetch = self.next_fetch();
                let (tx, rx) = watch::channel(RecordState::Loading);
                entry.insert(CacheEntry { tx, fetch });
                self.spawn_fetch(id.clone(), fetch);
                rx
            }
        }
    }
}
