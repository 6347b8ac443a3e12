//! Plugin System Module
//!
//! Loads editor plugins from native shared libraries and drives them through
//! their lifecycle: discovery, mapping, instantiation, initialization,
//! enable/disable, cleanup and unmapping.
//!
//! # Example Usage
//!
//! ```no_run
//! use quill::plugin::PluginManager;
//!
//! let mut manager = PluginManager::new();
//! let loaded = manager.scan_plugin_directory("/usr/lib/quill/plugins");
//! for name in manager.plugin_list() {
//!     manager.enable_plugin(&name).ok();
//! }
//! # let _ = loaded;
//! ```

pub mod contract;
pub mod error;
pub mod loader;
pub mod registry;
pub mod manager;
pub mod settings;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export core types for easier access
pub use contract::{
    EditorPlugin, PluginBox, PluginInstance, CreatePluginFn, DestroyPluginFn,
    CREATE_SYMBOL, DESTROY_SYMBOL,
};
pub use error::{PluginError, PluginResult};
pub use loader::{ModuleLoader, NativeLoader, NativeModule};
pub use registry::{PluginEntry, PluginInfo, PluginRegistry};
pub use manager::{PluginManager, SharedPluginManager, derive_plugin_name};
pub use settings::PluginSettings;
pub use state::PluginStates;
