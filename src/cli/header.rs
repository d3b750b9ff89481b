//! Playground header line and its JSON form.

use crate::cli::output::{colors, format_bytes, format_relative_time};
use crate::core::services::Playground;
use crate::core::session::{SessionState, SessionStatus};
use crate::core::types::{EngineStats, SearchMode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Serializable view of the session read model
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub status: SessionStatus,
    pub initialized: bool,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<EngineStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
    pub attempt: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_at: Option<DateTime<Utc>>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        Self {
            status: state.status,
            initialized: state.initialized(),
            loading: state.loading(),
            error: state.error_message(),
            stats: state.stats,
            search_mode: state.search_mode,
            attempt: state.attempt,
            ready_at: state.ready_at,
        }
    }
}

/// Everything the header shows
#[derive(Debug, Serialize)]
pub struct HeaderView {
    pub theme: String,
    pub language: String,
    pub direction: String,
    pub notification_anchor: String,
    pub session: SessionView,
}

impl HeaderView {
    pub fn capture(playground: &Playground) -> Self {
        let language = playground.language.language();
        let mut session = SessionView::from(&playground.session.current_state());
        session.stats = live_stats(playground);
        Self {
            theme: playground.theme.theme().to_string(),
            language: language.to_string(),
            direction: language.direction().to_string(),
            notification_anchor: language.notification_anchor().as_str().to_string(),
            session,
        }
    }
}

/// Stats from ready time with the loaded tile count read now
fn live_stats(playground: &Playground) -> Option<EngineStats> {
    let mut stats = playground.session.current_state().stats?;
    if let Ok(engine) = playground.session.engine() {
        stats.tiles_loaded = engine.loaded_tiles().len();
    }
    Some(stats)
}

/// One-line header for human output
pub fn render(playground: &Playground) -> String {
    let theme = playground.theme.theme();
    let language = playground.language.language();
    let state = playground.session.current_state();

    let mut parts = vec![
        format!("{}", colors::accent("geoplay", theme)),
        format!("theme {}", colors::label(theme.as_str())),
        format!(
            "lang {} ({})",
            colors::label(language.as_str()),
            language.direction()
        ),
        format!("engine {}", colors::status(state.status)),
    ];

    if let Some(mode) = state.search_mode {
        parts.push(format!("mode {}", colors::dim(mode.as_str())));
    }
    if let Some(stats) = live_stats(playground) {
        parts.push(format!(
            "{} tiles ({} loaded)",
            colors::number(&stats.total_tiles.to_string()),
            colors::number(&stats.tiles_loaded.to_string())
        ));
        parts.push(format!(
            "{} addresses",
            colors::number(&stats.total_addresses.to_string())
        ));
        parts.push(format_bytes(stats.total_size_kb.saturating_mul(1024)));
    }
    if let Some(ready_at) = state.ready_at {
        parts.push(format!(
            "{}",
            colors::dim(&format!("ready {}", format_relative_time(&ready_at)))
        ));
    }

    parts.join(" · ")
}

/// Message and retry hint for a failed session
pub fn failure_hint(state: &SessionState) -> Option<String> {
    let message = state.error_message()?;
    Some(format!(
        "{message}\nHint: check the dataset directory (GEOPLAY_DATASET_DIR), \
         then run the command again or type `retry` in `geoplay shell`"
    ))
}
