//! Core playground logic (presentation-agnostic)
//!
//! This module contains everything that is independent of how the
//! playground is rendered.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Engine contract data structures
//! - **xdg**: XDG directory handling
//! - **engine**: `GeoEngine` / `EngineFactory` traits and the local
//!   dataset engine
//! - **session**: Shared engine lifecycle (idle/loading/ready/error)
//! - **preferences**: Persisted key/value preferences
//! - **theme**: Light/dark resolution and change notifications
//! - **language**: Active locale and text direction
//! - **services**: Playground container

pub mod config;
pub mod engine;
pub mod error;
pub mod language;
pub mod preferences;
pub mod services;
pub mod session;
pub mod theme;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{GeoError, Result};
pub use services::Playground;
pub use session::{SessionManager, SessionState, SessionStatus};
