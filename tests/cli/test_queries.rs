//! Tests for the engine query commands

use crate::common::{create_test_playground, TestDataset};
use geoplay::cli::commands::dataset::{execute_postcodes, execute_tiles, PostcodesArgs, TilesArgs};
use geoplay::cli::commands::geocode::{execute as execute_geocode, GeocodeArgs};
use geoplay::cli::commands::location::{execute_admin, execute_country, PointArgs};
use geoplay::cli::commands::lookup::{execute_number, execute_postcode, NumberArgs, PostcodeArgs};
use geoplay::cli::commands::reverse::{execute as execute_reverse, ReverseArgs};
use geoplay::cli::commands::suggest::{execute as execute_suggest, SuggestArgs};
use geoplay::cli::OutputFormat;
use geoplay::core::types::DetailLevel;
use geoplay::Language;

fn geocode_args(query: &str) -> GeocodeArgs {
    GeocodeArgs {
        query: query.split_whitespace().map(String::from).collect(),
        limit: Some(3),
        bbox: None,
        regions: vec![],
    }
}

fn riyadh() -> PointArgs {
    PointArgs {
        lat: 24.7001,
        lon: 46.6801,
    }
}

// =============================================================================
// geocode / reverse
// =============================================================================

#[tokio::test]
async fn test_geocode_both_formats() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute_geocode(geocode_args("olaya street"), &playground, format).await;
        assert!(result.is_ok(), "geocode should succeed: {result:?}");
    }
    assert!(playground.session.current_state().initialized());
}

#[tokio::test]
async fn test_geocode_arabic_display() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());
    playground.language.set_language(Language::Ar);

    let result = execute_geocode(geocode_args("king fahd"), &playground, OutputFormat::Human).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_geocode_reports_failed_session_with_hint() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());

    let err = execute_geocode(geocode_args("olaya"), &playground, OutputFormat::Human)
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Failed to initialize engine"));
    assert!(message.contains("retry"));
}

#[tokio::test]
async fn test_geocode_bad_query_is_an_error() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let result = execute_geocode(geocode_args("   "), &playground, OutputFormat::Json).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_reverse() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let args = ReverseArgs {
        lat: 24.7,
        lon: 46.68,
        limit: None,
        radius: Some(1_000.0),
        detail: DetailLevel::Postcode,
        neighbors: true,
    };
    assert!(execute_reverse(args, &playground, OutputFormat::Human)
        .await
        .is_ok());

    let out_of_range = ReverseArgs {
        lat: 124.7,
        lon: 46.68,
        limit: None,
        radius: None,
        detail: DetailLevel::Full,
        neighbors: false,
    };
    assert!(execute_reverse(out_of_range, &playground, OutputFormat::Json)
        .await
        .is_err());
}

// =============================================================================
// postcode / number
// =============================================================================

#[tokio::test]
async fn test_postcode_and_number() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let args = PostcodeArgs {
        postcode: "12211".to_string(),
        number: Some("7421".to_string()),
        limit: None,
    };
    assert!(execute_postcode(args, &playground, OutputFormat::Json)
        .await
        .is_ok());

    let args = NumberArgs {
        number: "7421".to_string(),
        region: Some("Riyadh Region".to_string()),
        bbox: None,
        limit: Some(10),
    };
    assert!(execute_number(args, &playground, OutputFormat::Human)
        .await
        .is_ok());
}

// =============================================================================
// admin / country / postcodes / tiles
// =============================================================================

#[tokio::test]
async fn test_admin_and_country() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        assert!(execute_admin(riyadh(), &playground, format).await.is_ok());
        assert!(execute_country(riyadh(), &playground, format).await.is_ok());
    }

    let paris = PointArgs {
        lat: 48.85,
        lon: 2.35,
    };
    assert!(execute_country(paris, &playground, OutputFormat::Human)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_postcodes_and_tiles() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let args = PostcodesArgs {
        prefix: Some("12".to_string()),
        limit: 2,
    };
    assert!(execute_postcodes(args, &playground, OutputFormat::Human)
        .await
        .is_ok());

    let args = TilesArgs {
        bbox: Some("46.0,24.0,47.0,25.0".parse().unwrap()),
        region: None,
        loaded: false,
    };
    assert!(execute_tiles(args, &playground, OutputFormat::Json)
        .await
        .is_ok());

    let args = TilesArgs {
        bbox: None,
        region: None,
        loaded: true,
    };
    assert!(execute_tiles(args, &playground, OutputFormat::Human)
        .await
        .is_ok());

    let args = TilesArgs {
        bbox: None,
        region: Some("Makkah Region".to_string()),
        loaded: false,
    };
    assert!(execute_tiles(args, &playground, OutputFormat::Human)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_suggest_both_formats() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    for (query, format) in [("122", OutputFormat::Json), ("ola", OutputFormat::Human)] {
        let args = SuggestArgs {
            query: vec![query.to_string()],
            limit: None,
            bbox: None,
            regions: vec![],
        };
        let result = execute_suggest(args, &playground, format).await;
        assert!(result.is_ok(), "suggest {query} should succeed: {result:?}");
    }

    let blank = SuggestArgs {
        query: vec!["  ".to_string()],
        limit: None,
        bbox: None,
        regions: vec![],
    };
    assert!(execute_suggest(blank, &playground, OutputFormat::Json)
        .await
        .is_err());
}

#[tokio::test]
async fn test_commands_share_one_engine() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    execute_geocode(geocode_args("olaya"), &playground, OutputFormat::Json)
        .await
        .unwrap();
    let first = playground.session.engine().unwrap();
    execute_admin(riyadh(), &playground, OutputFormat::Json)
        .await
        .unwrap();
    let second = playground.session.engine().unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(playground.session.current_state().attempt, 1);
}
