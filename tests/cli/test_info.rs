//! Tests for the info and show-config commands

use crate::common::{create_test_playground, TestDataset};
use geoplay::cli::commands::config::{execute as execute_config, ConfigArgs};
use geoplay::cli::commands::info::{execute as execute_info, InfoArgs};
use geoplay::cli::OutputFormat;
use geoplay::core::xdg::XdgDirs;
use geoplay::SessionStatus;

// =============================================================================
// info
// =============================================================================

/// Plain info leaves the engine alone
#[tokio::test]
async fn test_info_basic() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());
    let xdg = XdgDirs::new();

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute_info(InfoArgs { detailed: false }, &playground, &xdg, format).await;
        assert!(result.is_ok(), "info should succeed");
    }
    assert_eq!(playground.session.current_state().status, SessionStatus::Idle);
}

/// Detailed info initializes the engine to report the search mode
#[tokio::test]
async fn test_info_detailed() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());
    let xdg = XdgDirs::new();

    let result = execute_info(InfoArgs { detailed: true }, &playground, &xdg, OutputFormat::Json).await;
    assert!(result.is_ok());

    let state = playground.session.current_state();
    assert_eq!(state.status, SessionStatus::Ready);
    assert!(state.search_mode.is_some());
}

// =============================================================================
// show-config
// =============================================================================

#[tokio::test]
async fn test_show_config_all_forms() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute_config(ConfigArgs { toml: false }, &playground, format).await;
        assert!(result.is_ok(), "show-config should succeed");
    }

    let result = execute_config(ConfigArgs { toml: true }, &playground, OutputFormat::Human).await;
    assert!(result.is_ok(), "show-config --toml should succeed");
}

/// The TOML form loads back as the same configuration
#[test]
fn test_config_toml_reloads() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let text = toml::to_string_pretty(playground.config.as_ref()).unwrap();
    let reloaded: geoplay::Config = toml::from_str(&text).unwrap();

    assert_eq!(reloaded.engine.dataset_dir, dataset.path());
    assert_eq!(reloaded.search.default_limit, playground.config.search.default_limit);
}
