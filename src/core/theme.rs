//! Light/dark theme resolution.
//!
//! The active theme is derived, highest priority first, from:
//!
//! 1. the explicit marker (`--theme` / `GEOPLAY_THEME`, or a theme
//!    set during this run)
//! 2. the persisted preference (`theme` in preferences.toml)
//! 3. the terminal's reported background (`COLORFGBG`)
//! 4. `light`
//!
//! Without an interactive terminal there is no background to report, so
//! only the marker and the persisted preference apply before `light`.

use crate::core::error::Result;
use crate::core::preferences::{PreferenceStore, THEME_KEY};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::Mutex;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// Apply the precedence rules to the three theme sources
pub fn resolve_theme(
    marker: Option<Theme>,
    persisted: Option<Theme>,
    os_preference: Option<Theme>,
) -> Theme {
    marker.or(persisted).or(os_preference).unwrap_or_default()
}

/// Interpret a `COLORFGBG` value ("fg;bg" or "fg;default;bg")
pub fn parse_colorfgbg(value: &str) -> Option<Theme> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    // Colors 0-6 and 8 are dark backgrounds in the 16-color palette
    match background {
        0..=6 | 8 => Some(Theme::Dark),
        7 | 9..=15 => Some(Theme::Light),
        _ => None,
    }
}

/// What the process knows about its display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEnvironment {
    pub interactive: bool,
    pub os_preference: Option<Theme>,
}

impl DisplayEnvironment {
    /// Probe stdout and the terminal's color hint
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdout().is_terminal(),
            os_preference: env::var("COLORFGBG")
                .ok()
                .and_then(|v| parse_colorfgbg(&v)),
        }
    }

    pub fn interactive(os_preference: Option<Theme>) -> Self {
        Self {
            interactive: true,
            os_preference,
        }
    }

    pub fn headless() -> Self {
        Self {
            interactive: false,
            os_preference: None,
        }
    }
}

struct Sources {
    marker: Option<Theme>,
    os_preference: Option<Theme>,
}

/// Observable theme state
pub struct ThemeStore {
    prefs: PreferenceStore,
    interactive: bool,
    sources: Mutex<Sources>,
    tx: watch::Sender<Theme>,
}

impl ThemeStore {
    pub fn new(prefs: PreferenceStore, env: DisplayEnvironment, marker: Option<Theme>) -> Self {
        let sources = Sources {
            marker,
            os_preference: env.os_preference,
        };
        let initial = Self::derive(&prefs, env.interactive, &sources);
        let (tx, _rx) = watch::channel(initial);

        Self {
            prefs,
            interactive: env.interactive,
            sources: Mutex::new(sources),
            tx,
        }
    }

    /// Currently resolved theme
    pub fn theme(&self) -> Theme {
        *self.tx.borrow()
    }

    /// Theme the user saved, if any
    pub fn persisted(&self) -> Option<Theme> {
        read_persisted(&self.prefs)
    }

    /// Set the marker and persist the choice
    pub fn set_theme(&self, theme: Theme) -> Result<Theme> {
        self.prefs.set(THEME_KEY, theme.as_str())?;
        self.lock_sources().marker = Some(theme);
        tracing::debug!("Theme set to {}", theme);
        Ok(self.refresh())
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        self.set_theme(self.theme().toggled())
    }

    /// Re-derive after an outside change (e.g. another process
    /// rewrote the preference file) and notify if it moved
    pub fn refresh(&self) -> Theme {
        let theme = {
            let sources = self.lock_sources();
            Self::derive(&self.prefs, self.interactive, &sources)
        };
        self.tx.send_if_modified(|current| {
            if *current == theme {
                false
            } else {
                *current = theme;
                true
            }
        });
        theme
    }

    /// The terminal reported a new background. Only takes effect on an
    /// interactive terminal while nothing is persisted, in which case it
    /// also replaces the marker.
    pub fn os_preference_changed(&self, theme: Theme) -> Theme {
        let persisted = self.persisted();
        {
            let mut sources = self.lock_sources();
            sources.os_preference = Some(theme);
            if self.interactive && persisted.is_none() && sources.marker.is_some() {
                sources.marker = Some(theme);
            }
        }
        self.refresh()
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }

    pub fn preferences_path(&self) -> &std::path::Path {
        self.prefs.path()
    }

    fn derive(prefs: &PreferenceStore, interactive: bool, sources: &Sources) -> Theme {
        let os_preference = if interactive {
            sources.os_preference
        } else {
            None
        };
        resolve_theme(sources.marker, read_persisted(prefs), os_preference)
    }

    fn lock_sources(&self) -> std::sync::MutexGuard<'_, Sources> {
        self.sources.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn read_persisted(prefs: &PreferenceStore) -> Option<Theme> {
    match prefs.get(THEME_KEY) {
        Ok(Some(value)) => value.parse().ok(),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable theme preference: {}", e);
            None
        }
    }
}
