//! Shared engine lifecycle over a real dataset

use crate::common::{engine_options, CountingFactory, TestDataset};
use geoplay::core::session::{SessionManager, SessionStatus};
use geoplay::core::types::GeocodeOptions;
use std::sync::Arc;

fn manager(dataset: &TestDataset) -> (SessionManager, Arc<CountingFactory>) {
    let factory = Arc::new(CountingFactory::default());
    let session = SessionManager::new(factory.clone(), engine_options(dataset.path(), true));
    (session, factory)
}

#[tokio::test]
async fn test_acquire_initializes_local_engine() {
    let dataset = TestDataset::saudi();
    let (session, factory) = manager(&dataset);

    let state = session.acquire().await;
    assert!(state.initialized());
    let stats = state.stats.unwrap();
    assert_eq!(stats.total_tiles, 3);
    assert_eq!(stats.total_addresses, 7);
    assert_eq!(stats.tiles_loaded, 0);
    assert_eq!(factory.constructions(), 1);

    let engine = session.engine().unwrap();
    let results = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap();
    assert!(!results.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers_share_one_engine() {
    let dataset = TestDataset::saudi();
    let (session, factory) = manager(&dataset);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.acquire().await })
        })
        .collect();

    let mut engines = Vec::new();
    for handle in handles {
        let state = handle.await.unwrap();
        assert_eq!(state.status, SessionStatus::Ready);
        engines.push(state.engine.unwrap());
    }

    assert_eq!(factory.constructions(), 1);
    assert!(engines.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[tokio::test]
async fn test_failure_then_manual_retry() {
    let dataset = TestDataset::empty();
    let (session, factory) = manager(&dataset);

    let state = session.acquire().await;
    assert_eq!(state.status, SessionStatus::Error);
    assert!(state.engine.is_none());
    assert!(state.error.as_ref().unwrap().is_initialization());
    assert!(matches!(session.engine(), Err(e) if e.is_not_ready()));

    // Fixing the dataset alone does not recover the session
    dataset.populate();
    assert_eq!(session.acquire().await.status, SessionStatus::Error);
    assert_eq!(factory.constructions(), 1);

    let state = session.retry().await;
    assert!(state.initialized());
    assert!(state.error.is_none());
    assert_eq!(factory.constructions(), 2);
}

#[tokio::test]
async fn test_reset_swaps_engine_instance() {
    let dataset = TestDataset::saudi();
    let (session, factory) = manager(&dataset);

    let first = session.acquire().await.engine.unwrap();
    let idle = session.reset();
    assert_eq!(idle.status, SessionStatus::Idle);
    assert!(idle.engine.is_none());

    let second = session.acquire().await.engine.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(factory.constructions(), 2);

    // The old handle still answers for whoever holds it
    assert!(first
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .is_ok());
}
