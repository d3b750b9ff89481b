//! Error types and error handling for the geoplay playground.
//!
//! This module defines the error types used throughout the
//! application. The engine lifecycle surfaces a single kind,
//! `InitializationFailed`; the remaining variants come from engine
//! queries, configuration and the preference store.

use thiserror::Error;

/// Result type alias for geoplay operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for geoplay
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Failed to initialize engine: {0}")]
    InitializationFailed(String),

    #[error("Engine not ready (status: {0})")]
    EngineNotReady(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Dataset error: {0}")]
    DatasetError(String),

    #[error("Tile not found: {0}")]
    TileNotFound(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Preference error: {0}")]
    PreferenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GeoError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if the engine was not usable yet
    pub fn is_not_ready(&self) -> bool {
        matches!(self, GeoError::EngineNotReady(_))
    }

    /// Check if this is an initialization failure
    pub fn is_initialization(&self) -> bool {
        matches!(self, GeoError::InitializationFailed(_))
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidQuery(_)
                | GeoError::InvalidCoordinates { .. }
                | GeoError::ConfigError(_)
        )
    }
}
