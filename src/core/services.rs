//! Playground service container.
//!
//! Every command receives one `Playground`; it replaces any
//! process-wide engine singleton.

use crate::core::config::Config;
use crate::core::engine::{EngineFactory, LocalEngineFactory};
use crate::core::language::LanguageStore;
use crate::core::preferences::PreferenceStore;
use crate::core::session::SessionManager;
use crate::core::theme::{DisplayEnvironment, Theme, ThemeStore};
use crate::core::xdg::XdgDirs;
use std::sync::Arc;

/// Shared playground state
#[derive(Clone)]
pub struct Playground {
    /// Application configuration
    pub config: Arc<Config>,

    /// Shared engine lifecycle
    pub session: SessionManager,

    pub theme: Arc<ThemeStore>,

    pub language: Arc<LanguageStore>,
}

impl Playground {
    /// Local dataset engine, real display, XDG preference file
    pub fn new(config: Config, theme_marker: Option<Theme>) -> Self {
        let prefs = PreferenceStore::new(XdgDirs::new().preferences_file());
        Self::with_parts(
            config,
            Arc::new(LocalEngineFactory),
            prefs,
            DisplayEnvironment::detect(),
            theme_marker,
        )
    }

    /// Fully injected constructor
    pub fn with_parts(
        config: Config,
        factory: Arc<dyn EngineFactory>,
        prefs: PreferenceStore,
        display: DisplayEnvironment,
        theme_marker: Option<Theme>,
    ) -> Self {
        let session = SessionManager::new(factory, config.engine_options());
        let theme = Arc::new(ThemeStore::new(prefs, display, theme_marker));
        let language = Arc::new(LanguageStore::new(config.ui.language));

        Self {
            config: Arc::new(config),
            session,
            theme,
            language,
        }
    }
}
