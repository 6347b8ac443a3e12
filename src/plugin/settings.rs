//! Plugin Settings
//!
//! Where plugins are discovered and how their state is persisted. Built from
//! the `[plugins]` configuration section, then overridden by CLI arguments.

use std::path::PathBuf;

/// Settings for plugin discovery and state handling
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSettings {
    /// Directory scanned for plugin modules
    pub directory: PathBuf,
    /// File holding persisted enabled/disabled state
    pub state_file: Option<PathBuf>,
    /// Plugins to enable after discovery
    pub enable: Vec<String>,
    /// Plugins to disable after discovery
    pub disable: Vec<String>,
    /// Whether state is written back on exit
    pub save_state: bool,
}

impl PluginSettings {
    /// Apply command line overrides
    pub fn update_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(dir) = &args.plugin_dir {
            self.directory = dir.clone();
        }
        if args.no_state {
            self.state_file = None;
        } else if let Some(state_file) = &args.state_file {
            self.state_file = Some(state_file.clone());
        }
        for name in &args.enable {
            if !self.enable.contains(name) {
                self.enable.push(name.clone());
            }
        }
        self.disable.retain(|name| !args.enable.contains(name));
        self.enable.retain(|name| !args.disable.contains(name));
        for name in &args.disable {
            if !self.disable.contains(name) {
                self.disable.push(name.clone());
            }
        }
        if args.save_state {
            self.save_state = true;
        }
    }
}

/// Default plugin directory under the user's data directory
pub fn default_plugin_directory() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("quill").join("plugins"))
        .unwrap_or_else(|| PathBuf::from("plugins"))
}

/// Default state file under the user's config directory
pub fn default_state_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quill").join("plugins.toml"))
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            state_file: default_state_file(),
            enable: Vec::new(),
            disable: Vec::new(),
            save_state: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crate::cli::Args;

    #[test]
    fn test_default_directory_ends_with_plugins() {
        let settings = PluginSettings::default();
        assert!(settings.directory.ends_with("plugins"));
        assert!(settings.enable.is_empty());
        assert!(!settings.save_state);
    }

    #[test]
    fn test_args_override_settings() {
        let mut settings = PluginSettings {
            enable: vec!["autosave".to_string(), "terminal".to_string()],
            ..Default::default()
        };

        let args = Args::parse_from([
            "quill",
            "--plugin-dir", "/opt/quill/plugins",
            "--enable", "line_numbers",
            "--disable", "terminal",
            "--save-state",
        ]);
        settings.update_with_args(&args);

        assert_eq!(settings.directory, PathBuf::from("/opt/quill/plugins"));
        assert_eq!(settings.enable, vec!["autosave".to_string(), "line_numbers".to_string()]);
        assert_eq!(settings.disable, vec!["terminal".to_string()]);
        assert!(settings.save_state);
    }

    #[test]
    fn test_cli_enable_overrides_configured_disable() {
        let mut settings = PluginSettings {
            disable: vec!["syntax".to_string(), "terminal".to_string()],
            ..Default::default()
        };

        let args = Args::parse_from(["quill", "--enable", "syntax"]);
        settings.update_with_args(&args);

        assert_eq!(settings.enable, vec!["syntax".to_string()]);
        assert_eq!(settings.disable, vec!["terminal".to_string()]);
    }

    #[test]
    fn test_no_state_clears_state_file() {
        let mut settings = PluginSettings {
            state_file: Some(PathBuf::from("/tmp/plugins.toml")),
            ..Default::default()
        };

        let args = Args::parse_from(["quill", "--no-state"]);
        settings.update_with_args(&args);
        assert!(settings.state_file.is_none());
    }
}
