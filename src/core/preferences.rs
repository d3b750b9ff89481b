//! Persisted user preferences.
//!
//! A flat key/value TOML file under the XDG state directory. The
//! file is read on every lookup so a change written by another
//! geoplay process is picked up on the next read.

use crate::core::error::{GeoError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const THEME_KEY: &str = "theme";

/// File-backed key/value preferences
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let values: BTreeMap<String, String> = toml::from_str(&contents)?;
        Ok(values)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string(values)
            .map_err(|e| GeoError::PreferenceError(format!("Failed to encode preferences: {e}")))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
