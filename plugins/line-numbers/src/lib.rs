//! Line number gutter for quill
//!
//! Build with `cargo build -p line-numbers` and copy the resulting
//! `libline_numbers` shared library into the plugin directory.
//!
//! The module carries no logging of its own: a `log` facade linked into a
//! separately built library has no logger installed, so output would be lost.

use quill::declare_plugin;
use quill::plugin::{EditorPlugin, PluginResult};

/// Renders a right-aligned line number gutter
pub struct LineNumbers {
    enabled: bool,
    min_width: usize,
    initialized: bool,
}

impl LineNumbers {
    pub fn new() -> Self {
        Self {
            enabled: false,
            min_width: 3,
            initialized: false,
        }
    }

    /// Gutter width for a buffer of `line_count` lines
    pub fn gutter_width(&self, line_count: usize) -> usize {
        line_count.max(1).to_string().len().max(self.min_width)
    }

    /// Prefix every line of `text` with its number; unchanged while disabled
    pub fn render(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }

        let width = self.gutter_width(text.lines().count());
        text.lines()
            .enumerate()
            .map(|(index, line)| format!("{:>width$} | {}", index + 1, line, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for LineNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPlugin for LineNumbers {
    fn name(&self) -> &str {
        "line-numbers"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Shows line numbers in the editor gutter"
    }

    fn initialize(&mut self) -> PluginResult<()> {
        self.initialized = true;
        Ok(())
    }

    fn cleanup(&mut self) {
        self.enabled = false;
        self.initialized = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

declare_plugin!(LineNumbers, LineNumbers::new);
