//! geoplay - terminal playground for a geocoding engine
//!
//! Exposes forward and reverse geocoding, postcode and building
//! number lookups, administrative hierarchy, country detection and
//! tile inspection through a bilingual (English/Arabic), light/dark
//! command-line UI.
//!
//! # Architecture
//!
//! - **core**: Domain logic (presentation-agnostic)
//!   - config, error, types, xdg
//!   - engine (contract + local dataset engine)
//!   - session (shared engine lifecycle)
//!   - preferences, theme, language
//!   - services (playground container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!   - subcommands, interactive shell, output rendering
//!
//! # Engine lifecycle
//!
//! One `SessionManager` owns at most one engine instance. Concurrent
//! `acquire()` calls share a single initialization attempt; failures
//! are kept in the session until an explicit `retry()`.

// Core domain logic (presentation-agnostic)
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::engine::{EngineFactory, GeoEngine, LocalEngine, LocalEngineFactory};
pub use core::error::{GeoError, Result};
pub use core::language::{Language, LanguageStore};
pub use core::services::Playground;
pub use core::session::{SessionManager, SessionState, SessionStatus};
pub use core::theme::{Theme, ThemeStore};
pub use core::types::*;
