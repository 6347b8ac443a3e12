//! Plugin Error Types
//!
//! One variant per way a plugin operation can fail. Every failure is reported
//! to the caller as a value; none of them terminate the host.

use std::path::Path;
use thiserror::Error;

/// Result type for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

/// Error types for plugin loading and lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// A plugin with the same name is already registered
    #[error("Plugin already loaded: {plugin_name}")]
    AlreadyLoaded { plugin_name: String },

    /// The module file could not be mapped into the process
    #[error("Failed to load plugin library {path}: {message}")]
    MappingFailed { path: String, message: String },

    /// A required entry point is missing from the module
    #[error("Symbol '{symbol}' not found in {path}")]
    SymbolNotFound { path: String, symbol: String },

    /// The creation entry point returned no instance
    #[error("Failed to create plugin instance from: {path}")]
    InstantiationFailed { path: String },

    /// The plugin's own initialization reported failure
    #[error("Plugin initialization failed: {message}")]
    InitializationFailed { message: String },

    /// The instance violates the plugin contract (empty or conflicting name)
    #[error("Invalid plugin: {message}")]
    InvalidPlugin { message: String },

    /// No registry entry exists for the name
    #[error("Plugin not found: {plugin_name}")]
    PluginNotFound { plugin_name: String },

    /// Plugin state file could not be parsed or produced
    #[error("Plugin configuration error: {message}")]
    ConfigurationError { message: String },

    /// Filesystem error while reading or writing plugin files
    #[error("IO error: {message}")]
    Io { message: String },
}

impl PluginError {
    /// Create a duplicate-name error
    pub fn already_loaded<S: Into<String>>(plugin_name: S) -> Self {
        Self::AlreadyLoaded { plugin_name: plugin_name.into() }
    }

    /// Create a mapping failure for the given library path
    pub fn mapping_failed<S: Into<String>>(path: &Path, message: S) -> Self {
        Self::MappingFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a missing symbol error
    pub fn symbol_not_found<S: Into<String>>(path: &Path, symbol: S) -> Self {
        Self::SymbolNotFound {
            path: path.display().to_string(),
            symbol: symbol.into(),
        }
    }

    /// Create an instantiation failure
    pub fn instantiation_failed(path: &Path) -> Self {
        Self::InstantiationFailed { path: path.display().to_string() }
    }

    /// Create an initialization failure
    pub fn initialization_failed<S: Into<String>>(message: S) -> Self {
        Self::InitializationFailed { message: message.into() }
    }

    /// Create an invalid plugin error
    pub fn invalid_plugin<S: Into<String>>(message: S) -> Self {
        Self::InvalidPlugin { message: message.into() }
    }

    /// Create a plugin not found error
    pub fn plugin_not_found<S: Into<String>>(plugin_name: S) -> Self {
        Self::PluginNotFound { plugin_name: plugin_name.into() }
    }

    /// Create a configuration error
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Check if the failure happened while bringing a module into the process
    pub fn is_load_error(&self) -> bool {
        matches!(self,
            PluginError::AlreadyLoaded { .. } |
            PluginError::MappingFailed { .. } |
            PluginError::SymbolNotFound { .. } |
            PluginError::InstantiationFailed { .. } |
            PluginError::InitializationFailed { .. } |
            PluginError::InvalidPlugin { .. }
        )
    }

    /// Check if the error is a lookup miss on the registry
    pub fn is_not_found(&self) -> bool {
        matches!(self, PluginError::PluginNotFound { .. })
    }
}

impl From<std::io::Error> for PluginError {
    fn from(err: std::io::Error) -> Self {
        PluginError::Io { message: err.to_string() }
    }
}

impl From<toml::de::Error> for PluginError {
    fn from(err: toml::de::Error) -> Self {
        PluginError::configuration_error(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for PluginError {
    fn from(err: toml::ser::Error) -> Self {
        PluginError::configuration_error(format!("TOML serialization error: {}", err))
    }
}
