//! Tests for the theme command

use crate::common::{create_test_playground, TestDataset};
use geoplay::cli::commands::theme::{execute, ThemeAction, ThemeArgs};
use geoplay::cli::OutputFormat;
use geoplay::core::preferences::{PreferenceStore, THEME_KEY};
use geoplay::Theme;

// =============================================================================
// theme show / set / toggle
// =============================================================================

/// Showing the theme changes nothing
#[tokio::test]
async fn test_theme_show() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());
    let before = playground.theme.theme();

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute(ThemeArgs { action: None }, &playground, format).await;
        assert!(result.is_ok(), "theme show should succeed");
    }

    assert_eq!(playground.theme.theme(), before);
    assert_eq!(playground.theme.persisted(), None);
}

/// Setting a theme persists it to the preference file
#[tokio::test]
async fn test_theme_set_persists() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());

    let args = ThemeArgs {
        action: Some(ThemeAction::Set { theme: Theme::Dark }),
    };
    execute(args, &playground, OutputFormat::Json).await.unwrap();

    assert_eq!(playground.theme.theme(), Theme::Dark);
    assert_eq!(playground.theme.persisted(), Some(Theme::Dark));

    let saved = std::fs::read_to_string(playground.theme.preferences_path()).unwrap();
    assert!(saved.contains("dark"));
}

/// Toggling twice returns to the original theme
#[tokio::test]
async fn test_theme_toggle_twice() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());
    let original = playground.theme.theme();
    let mut rx = playground.theme.subscribe();

    let toggle = || ThemeArgs {
        action: Some(ThemeAction::Toggle),
    };
    execute(toggle(), &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(playground.theme.theme(), original.toggled());
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    execute(toggle(), &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(playground.theme.theme(), original);
    assert_eq!(playground.theme.persisted(), Some(original));
}

// =============================================================================
// theme background
// =============================================================================

/// A background change applies until a theme is saved
#[tokio::test]
async fn test_theme_background_follows_terminal_until_saved() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());
    let background = |theme| ThemeArgs {
        action: Some(ThemeAction::Background { theme }),
    };

    execute(background(Theme::Dark), &playground, OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(playground.theme.theme(), Theme::Dark);
    assert_eq!(playground.theme.persisted(), None);

    let args = ThemeArgs {
        action: Some(ThemeAction::Set {
            theme: Theme::Light,
        }),
    };
    execute(args, &playground, OutputFormat::Json).await.unwrap();

    execute(background(Theme::Dark), &playground, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(playground.theme.theme(), Theme::Light);
}

/// Another process saving a theme shows up on refresh, as between shell lines
#[tokio::test]
async fn test_theme_saved_elsewhere_is_refreshed() {
    let dataset = TestDataset::empty();
    let (playground, _state) = create_test_playground(dataset.path());
    let mut rx = playground.theme.subscribe();
    assert_eq!(playground.theme.theme(), Theme::Light);

    PreferenceStore::new(playground.theme.preferences_path())
        .set(THEME_KEY, "dark")
        .unwrap();
    assert_eq!(playground.theme.refresh(), Theme::Dark);
    assert!(rx.has_changed().unwrap());
    assert_eq!(playground.theme.theme(), Theme::Dark);
}
