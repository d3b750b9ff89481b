//! Tests for shell line handling
//!
//! Drives `run_line` against a live playground the way the shell loop does.

use crate::common::{create_test_playground, TestDataset};
use geoplay::cli::commands::shell::{run_line, Flow};
use geoplay::cli::OutputFormat;
use geoplay::{Language, SessionStatus, Theme};

// =============================================================================
// shell-only commands
// =============================================================================

#[tokio::test]
async fn test_blank_and_help_lines_continue() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    for line in ["", "   ", "help", "frobnicate", "geocode"] {
        let flow = run_line(line, &playground, OutputFormat::Human).await.unwrap();
        assert_eq!(flow, Flow::Continue, "line {line:?}");
    }
    assert_eq!(playground.session.current_state().status, SessionStatus::Idle);
}

#[tokio::test]
async fn test_quit_and_exit() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    assert_eq!(
        run_line("quit", &playground, OutputFormat::Human).await.unwrap(),
        Flow::Quit
    );
    assert_eq!(
        run_line("exit", &playground, OutputFormat::Json).await.unwrap(),
        Flow::Quit
    );
}

#[tokio::test]
async fn test_lang_sets_and_toggles() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    run_line("lang ar", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(playground.language.language(), Language::Ar);

    run_line("lang", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(playground.language.language(), Language::En);
}

#[tokio::test]
async fn test_theme_line() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let flow = run_line("theme set light", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Continue);
    assert_eq!(playground.theme.theme(), Theme::Light);
    assert_eq!(playground.theme.persisted(), Some(Theme::Light));
}

// =============================================================================
// queries and retry
// =============================================================================

/// Query lines render their own header in human mode
#[tokio::test]
async fn test_query_line_renders_header() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    let flow = run_line("geocode \"olaya street\" -k 2", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Rendered);

    let flow = run_line("r 24.7 46.68", &playground, OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Continue);
}

/// A failed query surfaces as an error; the shell keeps going
#[tokio::test]
async fn test_query_line_on_failed_session() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());

    let err = run_line("postcode 12211", &playground, OutputFormat::Human)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("retry"));
    assert_eq!(playground.session.current_state().status, SessionStatus::Error);
}

/// `retry` recovers once the dataset appears
#[tokio::test]
async fn test_retry_after_fixing_dataset() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());

    assert!(run_line("admin 24.7 46.68", &playground, OutputFormat::Human)
        .await
        .is_err());

    dataset.populate();
    let flow = run_line("retry", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Rendered);

    let state = playground.session.current_state();
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.attempt, 2);

    let flow = run_line("admin 24.7 46.68", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Rendered);
}

// =============================================================================
// engine controls
// =============================================================================

#[tokio::test]
async fn test_clear_cache_line_drops_loaded_tiles() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    run_line("geocode olaya", &playground, OutputFormat::Json)
        .await
        .unwrap();
    let engine = playground.session.engine().unwrap();
    assert!(!engine.loaded_tiles().is_empty());

    let flow = run_line("clear-cache", &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Continue);
    assert!(engine.loaded_tiles().is_empty());

    let flow = run_line("s ola", &playground, OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(flow, Flow::Continue);
}

/// Engine controls need a ready engine; they never start one
#[tokio::test]
async fn test_debug_line_requires_ready_engine() {
    let dataset = TestDataset::saudi();
    let (playground, _state) = create_test_playground(dataset.path());

    assert!(run_line("debug on", &playground, OutputFormat::Human)
        .await
        .is_err());
    assert_eq!(playground.session.current_state().status, SessionStatus::Idle);

    playground.session.acquire().await;
    for line in ["debug on --level debug", "debug off"] {
        let flow = run_line(line, &playground, OutputFormat::Human).await.unwrap();
        assert_eq!(flow, Flow::Continue, "line {line:?}");
    }
}
