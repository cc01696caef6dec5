use std::sync::Arc;
use std::time::Duration;

use threadview::{MemoryFetcher, MessageId, MessageRecord, QueryCache, RecordSource, RecordState};

fn record(id: &str, body: &str) -> MessageRecord {
    MessageRecord::new(id.into(), "thread".into(), "alice", body)
}

fn fetcher_with(ids: &[&str], latency: Duration) -> Arc<MemoryFetcher> {
    let fetcher = Arc::new(MemoryFetcher::with_latency(latency));
    for id in ids {
        fetcher.put(record(id, &format!("body of {id}")));
    }
    fetcher
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_fetch() {
    let _ = env_logger::builder().is_test(true).try_init();

    let fetcher = fetcher_with(&["m1"], Duration::from_millis(50));
    let cache = QueryCache::new(fetcher.clone());
    let id = MessageId::new("m1");

    let rx1 = cache.subscribe(&id);
    let rx2 = cache.subscribe(&id);
    assert!(rx1.borrow().is_loading());
    assert!(rx2.borrow().is_loading());

    let state = cache.resolved(&id).await;
    assert_eq!(state.record().map(|r| r.body.as_str()), Some("body of m1"));
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_get_does_not_fetch() {
    let fetcher = fetcher_with(&["m1"], Duration::ZERO);
    let cache = QueryCache::new(fetcher.clone());

    assert_eq!(cache.get(&"m1".into()), RecordState::Loading);
    tokio::task::yield_now().await;
    assert_eq!(fetcher.fetch_count(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_failure_is_isolated_to_its_record() {
    let fetcher = fetcher_with(&["m1", "m2", "m3"], Duration::ZERO);
    fetcher.fail("m2".into());
    let cache = QueryCache::new(fetcher.clone());

    let ids: Vec<MessageId> = ["m1", "m2", "m3", "gone"].into_iter().map(MessageId::from).collect();
    let first = cache.request(&ids);
    assert_eq!(first.len(), 4);

    for id in &ids {
        cache.resolved(id).await;
    }
    let states = cache.request(&ids);
    assert!(states[&MessageId::new("m1")].record().is_some());
    assert!(matches!(states[&MessageId::new("m2")], RecordState::Failed(_)));
    assert!(states[&MessageId::new("m3")].record().is_some());
    assert!(matches!(states[&MessageId::new("gone")], RecordState::Failed(_)));
    // Failed entries stay failed; no refetch on a plain request.
    assert_eq!(fetcher.fetch_count(), 4);
}

#[tokio::test]
async fn test_invalidate_refetches_in_place() {
    let fetcher = fetcher_with(&["m1"], Duration::ZERO);
    fetcher.fail("m1".into());
    let cache = QueryCache::new(fetcher.clone());
    let id = MessageId::new("m1");

    assert!(matches!(cache.resolved(&id).await, RecordState::Failed(_)));

    let mut rx = cache.subscribe(&id);
    fetcher.heal(&id);
    cache.invalidate(&id);
    assert!(rx.borrow_and_update().is_loading());

    let state = rx.wait_for(RecordState::is_settled).await.unwrap().clone();
    assert!(state.record().is_some());
    assert_eq!(fetcher.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_insert_wins_over_in_flight_fetch() {
    let fetcher = fetcher_with(&["m1"], Duration::from_secs(1));
    let cache = QueryCache::new(fetcher.clone());
    let id = MessageId::new("m1");

    let _rx = cache.subscribe(&id);
    cache.insert(record("m1", "sent locally"));
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = cache.get(&id);
    assert_eq!(state.record().map(|r| r.body.as_str()), Some("sent locally"));
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_evicted_id_refetches() {
    let fetcher = fetcher_with(&["m1"], Duration::ZERO);
    let cache = QueryCache::new(fetcher.clone());
    let id = MessageId::new("m1");

    cache.resolved(&id).await;
    assert!(cache.evict(&id));
    assert!(!cache.evict(&id));
    assert!(cache.resolved(&id).await.record().is_some());
    assert_eq!(fetcher.fetch_count(), 2);
}
