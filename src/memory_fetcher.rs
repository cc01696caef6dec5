//! In-process [`RecordFetcher`] for demos and tests, with optional latency and
//! injected failures.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::RecordFetcher;
use crate::error::FetchError;
use threadcore::{MessageId, MessageRecord};

#[derive(Debug, Default)]
pub struct MemoryFetcher {
    records: DashMap<MessageId, MessageRecord>,
    failing: DashSet<MessageId>,
    latency: Duration,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn put(&self, record: MessageRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Makes every fetch of `id` fail until [`MemoryFetcher::heal`].
    pub fn fail(&self, id: MessageId) {
        self.failing.insert(id);
    }

    pub fn heal(&self, id: &MessageId) {
        self.failing.remove(id);
    }

    /// Total fetches served, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordFetcher for MemoryFetcher {
    async fn fetch(&self, id: &MessageId) -> Result<MessageRecord, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.contains(id) {
            return Err(FetchError::Request(format!("injected failure for {id}")));
        }
        self.records
            .get(id)
            .map(|record| record.value().clone())
            .ok_or(FetchError::NotFound)
    }
}
