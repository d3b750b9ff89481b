//! Forward geocoding against the synthetic dataset

use crate::common::fixtures::jeddah_addresses;
use crate::common::{open_engine, TestDataset, JEDDAH_TILE};
use geoplay::core::engine::GeoEngine;
use geoplay::core::types::{BBox, GeocodeOptions, SearchMode};
use std::sync::Arc;

fn ids(results: &[geoplay::GeocodingResult]) -> Vec<u64> {
    results.iter().filter_map(|r| r.addr_id).collect()
}

#[tokio::test]
async fn test_full_text_ranks_best_match_first() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;
    assert_eq!(engine.search_mode(), SearchMode::FtsBm25);

    let results = engine
        .geocode("olaya street", &GeocodeOptions::default())
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].addr_id, Some(2));
    assert_eq!(results[0].similarity, Some(1.0));
    assert!(results
        .windows(2)
        .all(|w| w[0].similarity >= w[1].similarity));
}

#[tokio::test]
async fn test_arabic_query() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let results = engine
        .geocode("الملز", &GeocodeOptions::default())
        .await
        .unwrap();

    let mut found = ids(&results);
    found.sort();
    assert_eq!(found, vec![4, 5]);
}

#[tokio::test]
async fn test_jaccard_mode() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), false).await;
    assert_eq!(engine.search_mode(), SearchMode::Jaccard);

    let results = engine
        .geocode("Tahlia Street", &GeocodeOptions::default())
        .await
        .unwrap();

    let mut top_two = ids(&results[..2]);
    top_two.sort();
    assert_eq!(top_two, vec![3, 6]);
    assert!(results.iter().all(|r| r.similarity.unwrap() > 0.0));

    let nothing = engine
        .geocode("zzzz", &GeocodeOptions::default())
        .await
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_limit() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let options = GeocodeOptions {
        limit: Some(1),
        ..GeocodeOptions::default()
    };
    let results = engine.geocode("street", &options).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_bbox_filter() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let options = GeocodeOptions {
        bbox: Some("39.0,21.0,39.5,22.0".parse::<BBox>().unwrap()),
        ..GeocodeOptions::default()
    };
    let results = engine.geocode("tahlia street", &options).await.unwrap();

    assert_eq!(ids(&results)[0], 6);
    assert!(results.iter().all(|r| r.latitude < 22.0));
}

#[tokio::test]
async fn test_region_filter_loads_only_matching_tiles() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), false).await;
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 0);

    let options = GeocodeOptions {
        regions: vec!["makkah region".to_string()],
        ..GeocodeOptions::default()
    };
    let results = engine.geocode("tahlia", &options).await.unwrap();

    assert_eq!(ids(&results), vec![6]);
    assert_eq!(engine.loaded_tiles(), vec![JEDDAH_TILE.to_string()]);
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 1);
}

#[tokio::test]
async fn test_tiles_stay_cached() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap();
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 3);

    // Removing the files does not matter once loaded
    std::fs::remove_dir_all(dataset.path().join("tiles")).unwrap();
    let again = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap();
    assert_eq!(again[0].addr_id, Some(2));
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let err = engine
        .geocode("   ", &GeocodeOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_missing_tile_file() {
    let dataset = TestDataset::missing_tile();
    let engine = open_engine(dataset.path(), true).await;

    let err = engine
        .geocode("tahlia", &GeocodeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, geoplay::GeoError::TileNotFound(ref id) if id == JEDDAH_TILE));
}

#[tokio::test]
async fn test_closed_engine_rejects_queries() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;
    engine.close().await.unwrap();

    let err = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_not_ready());
    assert!(engine.loaded_tiles().is_empty());
}

/// Queries racing on a cold engine all see the indexed tiles
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cold_geocodes_agree() {
    let dataset = TestDataset::saudi();
    let engine = Arc::new(open_engine(dataset.path(), true).await);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                engine
                    .geocode("olaya", &GeocodeOptions::default())
                    .await
                    .map(|results| results.len())
            })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap());
    }
    let after = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap()
        .len();

    assert!(after > 0);
    assert!(counts.iter().all(|&c| c == after), "counts {counts:?}");
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 3);
}

/// A tile that failed to load is read again on the next query
#[tokio::test]
async fn test_failed_tile_load_is_retried() {
    let dataset = TestDataset::missing_tile();
    let engine = open_engine(dataset.path(), true).await;

    assert!(engine
        .geocode("tahlia", &GeocodeOptions::default())
        .await
        .is_err());
    assert!(!engine.loaded_tiles().contains(&JEDDAH_TILE.to_string()));

    dataset.write_tile(JEDDAH_TILE, &jeddah_addresses());
    let results = engine
        .geocode("tahlia", &GeocodeOptions::default())
        .await
        .unwrap();

    let found = ids(&results);
    assert!(found.contains(&3));
    assert!(found.contains(&6));
    assert_eq!(engine.loaded_tiles().len(), 3);
}

#[tokio::test]
async fn test_clear_cache_reloads_without_duplicates() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let before = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap();
    engine.clear_cache();
    assert!(engine.loaded_tiles().is_empty());
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 0);

    let after = engine
        .geocode("olaya", &GeocodeOptions::default())
        .await
        .unwrap();
    assert_eq!(ids(&after), ids(&before));
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 3);
}

#[tokio::test]
async fn test_set_debug_keeps_queries_working() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), false).await;
    assert!(!engine.is_full_text_available());

    engine.set_debug(true, Some(geoplay::LogLevel::Debug));
    assert!(!engine
        .geocode("olaya street", &GeocodeOptions::default())
        .await
        .unwrap()
        .is_empty());
    engine.set_debug(false, None);
}
