//! Plugin State Persistence
//!
//! Enabled/disabled state of plugins across restarts, stored as TOML:
//!
//! ```toml
//! [plugins]
//! line_numbers = true
//! autosave = false
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use log::debug;
use serde::{Deserialize, Serialize};
use super::error::PluginResult;

/// Persisted map of plugin name to enabled flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginStates {
    #[serde(default)]
    plugins: BTreeMap<String, bool>,
}

impl PluginStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of one plugin
    pub fn set<S: Into<String>>(&mut self, name: S, enabled: bool) {
        self.plugins.insert(name.into(), enabled);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.plugins.get(name).copied()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.plugins.iter().map(|(name, enabled)| (name.as_str(), *enabled))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn from_toml(content: &str) -> PluginResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> PluginResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Read states from `path`; a missing file yields `None`
    pub fn load(path: &Path) -> PluginResult<Option<Self>> {
        if !path.exists() {
            debug!("No plugin state file at: {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        let states = Self::from_toml(&content)?;
        debug!("Read {} plugin states from: {}", states.len(), path.display());
        Ok(Some(states))
    }

    /// Write states to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> PluginResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_toml()?)?;
        debug!("Wrote {} plugin states to: {}", self.len(), path.display());
        Ok(())
    }
}
