//! Reverse geocoding, admin hierarchy and country detection

use crate::common::{open_engine, TestDataset};
use geoplay::core::engine::GeoEngine;
use geoplay::core::types::{DetailLevel, ReverseGeocodeOptions};

fn ids(results: &[geoplay::GeocodingResult]) -> Vec<u64> {
    results.iter().filter_map(|r| r.addr_id).collect()
}

#[tokio::test]
async fn test_nearest_first_within_default_radius() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let results = engine
        .reverse_geocode(24.7000, 46.6800, &ReverseGeocodeOptions::default())
        .await
        .unwrap();

    // Address 3 is over a kilometer away
    assert_eq!(ids(&results), vec![1, 2]);
    assert!(results[0].distance_m.unwrap() < 1.0);
    assert!(results[1].distance_m.unwrap() > 100.0);
    assert!(results[1].distance_m.unwrap() < 500.0);
}

#[tokio::test]
async fn test_radius_and_limit() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let wide = ReverseGeocodeOptions {
        radius_meters: Some(2_000.0),
        ..ReverseGeocodeOptions::default()
    };
    let results = engine.reverse_geocode(24.7000, 46.6800, &wide).await.unwrap();
    assert_eq!(ids(&results), vec![1, 2, 3]);

    let one = ReverseGeocodeOptions {
        radius_meters: Some(2_000.0),
        limit: Some(1),
        ..ReverseGeocodeOptions::default()
    };
    let results = engine.reverse_geocode(24.7000, 46.6800, &one).await.unwrap();
    assert_eq!(ids(&results), vec![1]);
}

#[tokio::test]
async fn test_detail_levels() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let minimal = ReverseGeocodeOptions {
        detail_level: DetailLevel::Minimal,
        limit: Some(1),
        ..ReverseGeocodeOptions::default()
    };
    let result = &engine
        .reverse_geocode(24.7000, 46.6800, &minimal)
        .await
        .unwrap()[0];
    assert!(result.postcode.is_none());
    assert!(result.region_en.is_none());
    assert!(result.full_address_en.is_some());
    assert!(result.distance_m.is_some());

    let region = ReverseGeocodeOptions {
        detail_level: DetailLevel::Region,
        limit: Some(1),
        ..ReverseGeocodeOptions::default()
    };
    let result = &engine
        .reverse_geocode(24.7000, 46.6800, &region)
        .await
        .unwrap()[0];
    assert_eq!(result.postcode.as_deref(), Some("12211"));
    assert_eq!(result.region_en.as_deref(), Some("Riyadh Region"));
    assert!(result.street.is_none());
}

#[tokio::test]
async fn test_include_neighbors_searches_adjacent_tiles() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    // Inside the Olaya tile, close to the Malaz tile
    let own_tile = ReverseGeocodeOptions {
        radius_meters: Some(5_000.0),
        ..ReverseGeocodeOptions::default()
    };
    let results = engine
        .reverse_geocode(24.6810, 46.6990, &own_tile)
        .await
        .unwrap();
    let mut found = ids(&results);
    found.sort();
    assert_eq!(found, vec![1, 2, 3]);

    let with_neighbors = ReverseGeocodeOptions {
        include_neighbors: true,
        ..own_tile
    };
    let results = engine
        .reverse_geocode(24.6810, 46.6990, &with_neighbors)
        .await
        .unwrap();
    let found = ids(&results);
    assert_eq!(found.len(), 5);
    assert!(found.contains(&4) && found.contains(&5));
    assert!(results
        .windows(2)
        .all(|w| w[0].distance_m <= w[1].distance_m));
}

#[tokio::test]
async fn test_invalid_input() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let err = engine
        .reverse_geocode(95.0, 46.0, &ReverseGeocodeOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, geoplay::GeoError::InvalidCoordinates { .. }));

    let negative = ReverseGeocodeOptions {
        radius_meters: Some(-5.0),
        ..ReverseGeocodeOptions::default()
    };
    let err = engine
        .reverse_geocode(24.7, 46.68, &negative)
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_admin_hierarchy() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let hierarchy = engine.admin_hierarchy(24.7001, 46.6801).await.unwrap();
    assert_eq!(hierarchy.district.unwrap().name_ar, "العليا");
    let governorate = hierarchy.governorate.unwrap();
    assert_eq!(governorate.name_en, "Riyadh");
    assert_eq!(governorate.name_ar, "الرياض");
    assert_eq!(hierarchy.region.unwrap().name_en, "Riyadh Region");

    // Nothing within 2 km in the Empty Quarter
    let empty = engine.admin_hierarchy(20.0, 50.0).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_detect_country() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    let country = engine.detect_country(24.7, 46.7).await.unwrap().unwrap();
    assert_eq!(country.iso_a2, "SA");
    assert_eq!(country.iso_a3, "SAU");

    // Paris
    assert!(engine.detect_country(48.85, 2.35).await.unwrap().is_none());
    assert_eq!(engine.stats().await.unwrap().tiles_loaded, 0);
}

#[tokio::test]
async fn test_is_in_country() {
    let dataset = TestDataset::saudi();
    let engine = open_engine(dataset.path(), true).await;

    assert!(engine.is_in_country(21.54, 39.16).await.unwrap());
    assert!(!engine.is_in_country(48.85, 2.35).await.unwrap());
    assert!(engine.is_in_country(95.0, 0.0).await.is_err());
}
