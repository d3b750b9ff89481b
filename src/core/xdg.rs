//! XDG Base Directory Support
//!
//! Resolves where geoplay keeps its config file, the bundled
//! dataset and the persisted theme preference.

use std::env;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "geoplay";

/// XDG directory structure for geoplay
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure
    ///
    /// Priority order (highest to lowest):
    /// 1. Explicit GEOPLAY_*_DIR env vars
    /// 2. XDG_* environment variables
    /// 3. XDG defaults (~/.config, ~/.local/share, ~/.local/state)
    pub fn new() -> Self {
        Self {
            config_dir: resolve("GEOPLAY_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"]),
            data_dir: resolve("GEOPLAY_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"]),
            state_dir: resolve("GEOPLAY_STATE_DIR", "XDG_STATE_HOME", &[".local", "state"]),
        }
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        if let Ok(file) = env::var("GEOPLAY_CONFIG_FILE") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }

    /// Default dataset directory (manifest.json + tiles/)
    pub fn dataset_dir(&self) -> PathBuf {
        self.data_dir.join("dataset")
    }

    /// Persisted UI preferences
    pub fn preferences_file(&self) -> PathBuf {
        self.state_dir.join("preferences.toml")
    }

    /// Create all XDG directories if they don't exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.state_dir)?;
        Ok(())
    }

    /// Log the resolved XDG paths
    pub fn log_paths(&self) {
        tracing::debug!("XDG directories resolved:");
        tracing::debug!("  Config: {:?}", self.config_dir);
        tracing::debug!("  Data: {:?}", self.data_dir);
        tracing::debug!("  State: {:?}", self.state_dir);
        tracing::debug!("  Config file: {:?}", self.config_file());
        tracing::debug!("  Preferences: {:?}", self.preferences_file());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(app_var: &str, xdg_var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(dir) = env::var(app_var) {
        return PathBuf::from(dir);
    }

    if let Ok(xdg) = env::var(xdg_var) {
        return PathBuf::from(xdg).join(APP_DIR);
    }

    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    for segment in home_default {
        path.push(segment);
    }
    path.join(APP_DIR)
}
