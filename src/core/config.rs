//! Configuration management for geoplay.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{GeoError, Result};
use crate::core::language::Language;
use crate::core::types::{EngineOptions, LogLevel};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Environment overrides that were ignored; reported by `log_config`
    /// once logging is up
    #[serde(skip)]
    pub env_warnings: Vec<String>,
}

/// Engine construction options
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Directory holding manifest.json and tiles/
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,

    /// Let the engine emit its own debug output
    #[serde(default = "default_debug")]
    pub debug: bool,

    /// Engine log threshold
    #[serde(default = "default_engine_log_level")]
    pub log_level: LogLevel,

    /// Use BM25 full-text search instead of token similarity
    #[serde(default = "default_full_text")]
    pub full_text: bool,
}

/// Query defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of results to return
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Maximum results per query
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Reverse geocoding radius in meters
    #[serde(default = "default_radius_m")]
    pub default_radius_m: f64,
}

/// Presentation defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default)]
    pub language: Language,
}

/// Log output for the playground itself
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

// Default value functions
fn default_dataset_dir() -> PathBuf {
    PathBuf::from("./dataset")
}

fn default_debug() -> bool {
    true
}

fn default_engine_log_level() -> LogLevel {
    LogLevel::Debug
}

fn default_full_text() -> bool {
    true
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

fn default_radius_m() -> f64 {
    500.0
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            debug: default_debug(),
            log_level: default_engine_log_level(),
            full_text: default_full_text(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_radius_m: default_radius_m(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Compact,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| GeoError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. GEOPLAY_CONFIG env var
    /// 2. XDG config file (~/.config/geoplay/config.toml)
    /// 3. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("GEOPLAY_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else {
                Self::default()
            }
        };

        // The relative default only makes sense next to a checkout; otherwise use XDG data
        if config.engine.dataset_dir == default_dataset_dir() && !default_dataset_dir().exists() {
            config.engine.dataset_dir = xdg.dataset_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    ///
    /// Runs before logging is initialized, so unusable values are
    /// collected in `env_warnings` instead of logged.
    pub fn merge_env(&mut self) {
        // Engine configuration
        if let Ok(dir) = env::var("GEOPLAY_DATASET_DIR") {
            self.engine.dataset_dir = PathBuf::from(dir);
        }
        if let Some(debug) = self.parse_env::<bool>("GEOPLAY_DEBUG") {
            self.engine.debug = debug;
        }
        if let Some(level) = self.parse_env::<LogLevel>("GEOPLAY_ENGINE_LOG_LEVEL") {
            self.engine.log_level = level;
        }
        if let Some(full_text) = self.parse_env::<bool>("GEOPLAY_FULL_TEXT") {
            self.engine.full_text = full_text;
        }

        // Search configuration
        if let Some(limit) = self.parse_env("GEOPLAY_DEFAULT_LIMIT") {
            self.search.default_limit = limit;
        }
        if let Some(max) = self.parse_env("GEOPLAY_MAX_LIMIT") {
            self.search.max_limit = max;
        }
        if let Some(radius) = self.parse_env("GEOPLAY_DEFAULT_RADIUS_M") {
            self.search.default_radius_m = radius;
        }

        // UI configuration
        if let Some(language) = self.parse_env::<Language>("GEOPLAY_LANG") {
            self.ui.language = language;
        }

        // Logging configuration
        if let Ok(level) = env::var("GEOPLAY_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("GEOPLAY_LOG_FORMAT") {
            match format.to_ascii_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "compact" => self.logging.format = LogFormat::Compact,
                other => self
                    .env_warnings
                    .push(format!("Ignoring unknown GEOPLAY_LOG_FORMAT '{other}'")),
            }
        }
    }

    fn parse_env<T: std::str::FromStr>(&mut self, var: &str) -> Option<T> {
        let raw = env::var(var).ok()?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.env_warnings
                    .push(format!("Ignoring unparsable {var}='{raw}'"));
                None
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.default_limit == 0 {
            return Err(GeoError::ConfigError(
                "Default limit must be non-zero".to_string(),
            ));
        }

        if self.search.default_limit > self.search.max_limit {
            return Err(GeoError::ConfigError(
                "Default limit cannot exceed max limit".to_string(),
            ));
        }

        if !(self.search.default_radius_m.is_finite() && self.search.default_radius_m > 0.0) {
            return Err(GeoError::ConfigError(
                "Default radius must be a positive number of meters".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(GeoError::ConfigError(
                "Logging level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Options passed to the engine factory
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            debug: self.engine.debug,
            log_level: self.engine.log_level,
            dataset_dir: self.engine.dataset_dir.clone(),
            full_text: self.engine.full_text,
        }
    }

    /// Clamp a requested result count to the configured bounds
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.search.default_limit)
            .clamp(1, self.search.max_limit)
    }

    /// Log configuration and any ignored environment overrides
    pub fn log_config(&self) {
        for warning in &self.env_warnings {
            tracing::warn!("{}", warning);
        }
        tracing::info!("Configuration loaded:");
        tracing::info!("  Dataset dir: {:?}", self.engine.dataset_dir);
        tracing::info!("  Engine debug: {}", self.engine.debug);
        tracing::info!("  Engine log level: {}", self.engine.log_level);
        tracing::info!("  Full text: {}", self.engine.full_text);
        tracing::info!("  Default limit: {}", self.search.default_limit);
        tracing::info!("  Max limit: {}", self.search.max_limit);
        tracing::info!("  Default radius: {} m", self.search.default_radius_m);
        tracing::info!("  Language: {}", self.ui.language);
    }
}
