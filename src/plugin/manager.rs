//! Plugin Manager
//!
//! Orchestrates discovery, loading, enablement and unloading of plugin
//! modules. Owns the plugin registry; the rest of the application reaches
//! plugins only through the manager's operations.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::{debug, error, info, warn};
use parking_lot::{Mutex, MutexGuard};
use crate::plugin::contract::{EditorPlugin, PluginInstance, CREATE_SYMBOL, DESTROY_SYMBOL};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::loader::{ModuleLoader, NativeLoader};
use crate::plugin::registry::{PluginEntry, PluginInfo, PluginRegistry};
use crate::plugin::state::PluginStates;

/// Derive the registry name for a module file: its file name without extension
pub fn derive_plugin_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

/// Central plugin manager.
///
/// Single-threaded: every mutation takes `&mut self` and runs synchronously.
/// Wrap in [`SharedPluginManager`] when more than one thread needs access.
/// Dropping the manager tears down every remaining plugin.
pub struct PluginManager<L: ModuleLoader = NativeLoader> {
    loader: L,
    registry: PluginRegistry<L::Handle>,
}

impl PluginManager<NativeLoader> {
    /// Create a manager using the platform's dynamic linker
    pub fn new() -> Self {
        Self::with_loader(NativeLoader::new())
    }
}

impl Default for PluginManager<NativeLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ModuleLoader> PluginManager<L> {
    /// Create a manager over a specific module loader
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            registry: PluginRegistry::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load a plugin module and register it in the disabled state.
    ///
    /// Returns the registry name, derived from the file name. A name already
    /// present is rejected before the file is touched. Any failure after the
    /// module is mapped releases everything acquired so far.
    pub fn load_plugin<P: AsRef<Path>>(&mut self, path: P) -> PluginResult<String> {
        let path = path.as_ref();
        let name = derive_plugin_name(path).ok_or_else(|| {
            PluginError::invalid_plugin(format!("Cannot derive plugin name from: {}", path.display()))
        })?;

        if self.registry.contains(&name) {
            warn!("Plugin already loaded: {} (ignoring {})", name, path.display());
            return Err(PluginError::already_loaded(name));
        }

        let handle = self.loader.map_library(path).map_err(|e| {
            error!("{}", e);
            e
        })?;

        let create = match self.loader.resolve_create(&handle, CREATE_SYMBOL) {
            Some(create) => create,
            None => {
                error!("Failed to find plugin create function in: {}", path.display());
                self.loader.unmap_library(handle);
                return Err(PluginError::symbol_not_found(path, CREATE_SYMBOL));
            }
        };

        let destroy = self.loader.resolve_destroy(&handle, DESTROY_SYMBOL);
        if destroy.is_none() {
            debug!("No {} in {}; host will free the instance", DESTROY_SYMBOL, path.display());
        }

        // SAFETY: `create` was resolved from the mapped module under the plugin ABI,
        // and the module stays mapped for as long as the instance lives.
        let instance = unsafe { PluginInstance::from_raw(create(), destroy) };
        let mut instance = match instance {
            Some(instance) => instance,
            None => {
                error!("Failed to create plugin instance from: {}", path.display());
                self.loader.unmap_library(handle);
                return Err(PluginError::instantiation_failed(path));
            }
        };

        if let Err(e) = self.check_identity(&name, instance.plugin()) {
            error!("{}", e);
            self.release(instance, handle);
            return Err(e);
        }

        if let Err(e) = instance.plugin_mut().initialize() {
            error!("Failed to initialize plugin {}: {}", name, e);
            self.release(instance, handle);
            return Err(PluginError::initialization_failed(format!("{}: {}", name, e)));
        }

        // the name was checked before mapping and `&mut self` rules out a concurrent insert
        let entry = PluginEntry::new(name.clone(), path.to_path_buf(), instance, handle);
        let inserted = self.registry.insert(entry);
        debug_assert!(inserted.is_ok(), "registry gained '{}' during load", name);
        if let Err(entry) = inserted {
            error!("Registry gained '{}' during load; releasing the new instance", name);
            let e = PluginError::already_loaded(entry.name());
            self.release_entry(entry);
            return Err(e);
        }

        info!("Plugin loaded successfully: {}", name);
        Ok(name)
    }

    /// Disable if needed, clean up, and release a plugin and its module
    pub fn unload_plugin(&mut self, name: &str) -> PluginResult<()> {
        if !self.registry.contains(name) {
            warn!("Cannot unload unknown plugin: {}", name);
            return Err(PluginError::plugin_not_found(name));
        }

        if self.is_plugin_enabled(name) {
            self.disable_plugin(name)?;
        }

        let entry = self.registry.remove(name)
            .ok_or_else(|| PluginError::plugin_not_found(name))?;
        self.release_entry(entry);

        info!("Plugin unloaded: {}", name);
        Ok(())
    }

    /// Enable a loaded plugin; enabling an enabled plugin is a no-op
    pub fn enable_plugin(&mut self, name: &str) -> PluginResult<()> {
        let entry = self.registry.get_mut(name)
            .ok_or_else(|| PluginError::plugin_not_found(name))?;

        if entry.is_enabled() {
            return Ok(());
        }

        entry.plugin_mut().enable();
        entry.set_enabled(true);
        info!("Plugin enabled: {}", name);
        Ok(())
    }

    /// Disable a loaded plugin; disabling a disabled plugin is a no-op
    pub fn disable_plugin(&mut self, name: &str) -> PluginResult<()> {
        let entry = self.registry.get_mut(name)
            .ok_or_else(|| PluginError::plugin_not_found(name))?;

        if !entry.is_enabled() {
            return Ok(());
        }

        entry.plugin_mut().disable();
        entry.set_enabled(false);
        info!("Plugin disabled: {}", name);
        Ok(())
    }

    /// Names of all loaded plugins
    pub fn plugin_list(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Borrow a loaded plugin.
    ///
    /// The reference cannot outlive the manager borrow, so it never survives
    /// a later `unload_plugin` of the same name.
    pub fn get_plugin(&self, name: &str) -> Option<&dyn EditorPlugin> {
        self.registry.get(name).map(|entry| entry.plugin())
    }

    pub fn get_plugin_mut(&mut self, name: &str) -> Option<&mut dyn EditorPlugin> {
        self.registry.get_mut(name).map(|entry| entry.plugin_mut())
    }

    pub fn is_plugin_loaded(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        self.registry.get(name).map(|entry| entry.is_enabled()).unwrap_or(false)
    }

    pub fn plugin_info(&self, name: &str) -> Option<PluginInfo> {
        self.registry.get(name).map(|entry| entry.info())
    }

    /// Summaries of all loaded plugins, sorted by name
    pub fn plugin_infos(&self) -> Vec<PluginInfo> {
        let mut infos: Vec<PluginInfo> = self.registry.iter().map(|entry| entry.info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    pub fn plugin_count(&self) -> usize {
        self.registry.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.registry.enabled_count()
    }

    /// Load every module directly inside `dir` (non-recursive).
    ///
    /// Only regular files with the platform library extension are tried.
    /// Returns the number of plugins newly loaded; a missing or unreadable
    /// directory yields 0.
    pub fn scan_plugin_directory<P: AsRef<Path>>(&mut self, dir: P) -> usize {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            info!("Plugin directory does not exist: {}", dir.display());
            return 0;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error scanning plugin directory {}: {}", dir.display(), e);
                return 0;
            }
        };

        let extension = self.loader.library_extension().to_string();
        let mut loaded_count = 0;

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("Failed to read entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension.as_str()) {
                continue;
            }

            match self.load_plugin(&path) {
                Ok(_) => loaded_count += 1,
                Err(e) => debug!("Skipped {}: {}", path.display(), e),
            }
        }

        info!("Scanned plugin directory: {}, loaded {} plugins", dir.display(), loaded_count);
        loaded_count
    }

    /// Current enabled state of every loaded plugin
    pub fn plugin_states(&self) -> PluginStates {
        let mut states = PluginStates::new();
        for entry in self.registry.iter() {
            states.set(entry.name(), entry.is_enabled());
        }
        states
    }

    /// Persist the enabled state of every loaded plugin to `path`
    pub fn save_plugin_config<P: AsRef<Path>>(&self, path: P) -> PluginResult<()> {
        let path = path.as_ref();
        self.plugin_states().save(path).map_err(|e| {
            error!("Failed to save plugin config to {}: {}", path.display(), e);
            e
        })?;
        info!("Saved plugin config: {}", path.display());
        Ok(())
    }

    /// Apply persisted enabled state from `path` to loaded plugins.
    ///
    /// Returns the number of states applied. A missing file applies nothing;
    /// states for plugins that are not loaded are ignored.
    pub fn load_plugin_config<P: AsRef<Path>>(&mut self, path: P) -> PluginResult<usize> {
        let path = path.as_ref();
        let states = match PluginStates::load(path) {
            Ok(Some(states)) => states,
            Ok(None) => return Ok(0),
            Err(e) => {
                error!("Failed to load plugin config from {}: {}", path.display(), e);
                return Err(e);
            }
        };

        let mut applied = 0;
        for (name, enabled) in states.iter() {
            if !self.is_plugin_loaded(name) {
                debug!("Plugin '{}' found in state file but not loaded; state ignored", name);
                continue;
            }

            if enabled {
                self.enable_plugin(name)?;
            } else {
                self.disable_plugin(name)?;
            }
            applied += 1;
        }

        info!("Applied {} plugin states from: {}", applied, path.display());
        Ok(applied)
    }

    /// Unload every plugin; returns how many were released
    pub fn unload_all(&mut self) -> usize {
        let entries = self.registry.drain();
        let count = entries.len();
        for entry in entries {
            let name = entry.name().to_string();
            self.release_entry(entry);
            debug!("Plugin unloaded during teardown: {}", name);
        }
        count
    }

    fn check_identity(&self, name: &str, plugin: &dyn EditorPlugin) -> PluginResult<()> {
        let reported = plugin.name();
        if reported.is_empty() {
            return Err(PluginError::invalid_plugin(format!("Plugin '{}' reports an empty name", name)));
        }
        if self.registry.has_reported_name(reported) {
            return Err(PluginError::invalid_plugin(format!(
                "Plugin '{}' reports name '{}' which is already registered", name, reported
            )));
        }
        Ok(())
    }

    fn release_entry(&self, mut entry: PluginEntry<L::Handle>) {
        if entry.is_enabled() {
            entry.plugin_mut().disable();
            entry.set_enabled(false);
            info!("Plugin disabled: {}", entry.name());
        }
        entry.plugin_mut().cleanup();

        let (instance, handle) = entry.into_parts();
        self.release(instance, handle);
    }

    /// Destroy the instance, then unmap the module that produced it
    fn release(&self, instance: PluginInstance, handle: L::Handle) {
        drop(instance);
        self.loader.unmap_library(handle);
    }
}

impl<L: ModuleLoader> Drop for PluginManager<L> {
    fn drop(&mut self) {
        let count = self.unload_all();
        if count > 0 {
            debug!("Plugin manager released {} plugins", count);
        }
    }
}

/// Thread-safe plugin manager wrapper.
///
/// Every operation, including iteration over the table, runs under one lock.
pub struct SharedPluginManager<L: ModuleLoader = NativeLoader> {
    inner: Arc<Mutex<PluginManager<L>>>,
}

impl<L: ModuleLoader> SharedPluginManager<L> {
    pub fn new(manager: PluginManager<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Hold the lock for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, PluginManager<L>> {
        self.inner.lock()
    }

    pub fn load_plugin<P: AsRef<Path>>(&self, path: P) -> PluginResult<String> {
        self.inner.lock().load_plugin(path)
    }

    pub fn unload_plugin(&self, name: &str) -> PluginResult<()> {
        self.inner.lock().unload_plugin(name)
    }

    pub fn enable_plugin(&self, name: &str) -> PluginResult<()> {
        self.inner.lock().enable_plugin(name)
    }

    pub fn disable_plugin(&self, name: &str) -> PluginResult<()> {
        self.inner.lock().disable_plugin(name)
    }

    pub fn scan_plugin_directory<P: AsRef<Path>>(&self, dir: P) -> usize {
        self.inner.lock().scan_plugin_directory(dir)
    }

    pub fn plugin_list(&self) -> Vec<String> {
        self.inner.lock().plugin_list()
    }

    pub fn is_plugin_loaded(&self, name: &str) -> bool {
        self.inner.lock().is_plugin_loaded(name)
    }

    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        self.inner.lock().is_plugin_enabled(name)
    }

    /// Run `f` against a loaded plugin while holding the lock
    pub fn with_plugin<R, F>(&self, name: &str, f: F) -> Option<R>
    where
        F: FnOnce(&dyn EditorPlugin) -> R,
    {
        let manager = self.inner.lock();
        manager.get_plugin(name).map(f)
    }
}

impl<L: ModuleLoader> Clone for SharedPluginManager<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
