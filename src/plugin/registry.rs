//! Plugin Registry
//!
//! Keyed table of loaded plugins. Each entry owns its module handle and its
//! plugin instance; nothing else holds either.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::plugin::contract::{EditorPlugin, PluginInstance};

/// Bookkeeping record for one loaded plugin.
///
/// `instance` is declared before `handle`: when an entry is dropped the
/// instance is destroyed while its module is still mapped.
pub struct PluginEntry<H> {
    name: String,
    path: PathBuf,
    instance: PluginInstance,
    enabled: bool,
    handle: H,
}

impl<H> PluginEntry<H> {
    /// Create an entry in the loaded, disabled state
    pub fn new(name: String, path: PathBuf, instance: PluginInstance, handle: H) -> Self {
        Self {
            name,
            path,
            instance,
            enabled: false,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn plugin(&self) -> &dyn EditorPlugin {
        self.instance.plugin()
    }

    pub fn plugin_mut(&mut self) -> &mut dyn EditorPlugin {
        self.instance.plugin_mut()
    }

    /// Snapshot of the entry for display and serialization
    pub fn info(&self) -> PluginInfo {
        let plugin = self.plugin();
        PluginInfo {
            name: self.name.clone(),
            reported_name: plugin.name().to_string(),
            version: plugin.version().to_string(),
            description: plugin.description().to_string(),
            path: self.path.clone(),
            enabled: self.enabled,
        }
    }

    /// Split the entry so the caller can destroy the instance before releasing the handle
    pub(crate) fn into_parts(self) -> (PluginInstance, H) {
        (self.instance, self.handle)
    }
}

impl<H> std::fmt::Debug for PluginEntry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Serializable summary of a loaded plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    /// Registry key, derived from the module file name
    pub name: String,
    /// Name the plugin reports for itself
    pub reported_name: String,
    pub version: String,
    pub description: String,
    pub path: PathBuf,
    pub enabled: bool,
}

/// Table of loaded plugins keyed by name
pub struct PluginRegistry<H> {
    entries: HashMap<String, PluginEntry<H>>,
}

impl<H> PluginRegistry<H> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Insert an entry; a name collision hands the entry back untouched
    pub fn insert(&mut self, entry: PluginEntry<H>) -> Result<(), PluginEntry<H>> {
        if self.entries.contains_key(&entry.name) {
            return Err(entry);
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    /// Remove and return an entry
    pub fn remove(&mut self, name: &str) -> Option<PluginEntry<H>> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PluginEntry<H>> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PluginEntry<H>> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Check whether any entry's instance reports `reported_name`
    pub fn has_reported_name(&self, reported_name: &str) -> bool {
        self.entries.values().any(|entry| entry.plugin().name() == reported_name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginEntry<H>> {
        self.entries.values()
    }

    /// Remove every entry
    pub fn drain(&mut self) -> Vec<PluginEntry<H>> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of entries currently enabled
    pub fn enabled_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.enabled).count()
    }
}

impl<H> Default for PluginRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
