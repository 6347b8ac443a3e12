//! Plugin Contract
//!
//! The capability set every editor plugin implements, and the two C-ABI entry
//! points a plugin module exports so the host can construct and destroy its
//! instance across the module boundary.
//!
//! A plugin crate is built as a `cdylib` and exports its entry points with
//! [`declare_plugin!`](crate::declare_plugin):
//!
//! ```ignore
//! use quill::plugin::{EditorPlugin, PluginResult};
//!
//! #[derive(Default)]
//! struct LineNumbers { enabled: bool }
//!
//! impl EditorPlugin for LineNumbers {
//!     fn name(&self) -> &str { "line_numbers" }
//!     fn version(&self) -> &str { "1.0.0" }
//!     fn description(&self) -> &str { "Shows line numbers in the gutter" }
//!     fn initialize(&mut self) -> PluginResult<()> { Ok(()) }
//!     fn cleanup(&mut self) {}
//!     fn enable(&mut self) { self.enabled = true; }
//!     fn disable(&mut self) { self.enabled = false; }
//!     fn is_enabled(&self) -> bool { self.enabled }
//! }
//!
//! quill::declare_plugin!(LineNumbers, LineNumbers::default);
//! ```

use std::ptr::NonNull;
use super::error::PluginResult;

/// Name of the exported creation entry point
pub const CREATE_SYMBOL: &str = "quill_create_plugin";

/// Name of the exported destruction entry point
pub const DESTROY_SYMBOL: &str = "quill_destroy_plugin";

/// Boxed trait object handed across the module boundary.
///
/// The entry points pass a thin pointer to this box so the pointer itself is
/// a plain address on both sides.
pub type PluginBox = Box<dyn EditorPlugin>;

/// Zero-argument creation entry point; returns an owning pointer or null
#[allow(improper_ctypes_definitions)]
pub type CreatePluginFn = unsafe extern "C" fn() -> *mut PluginBox;

/// One-argument destruction entry point; releases a pointer from [`CreatePluginFn`]
#[allow(improper_ctypes_definitions)]
pub type DestroyPluginFn = unsafe extern "C" fn(*mut PluginBox);

/// Interface every editor plugin must implement.
///
/// Instance states run `Constructed -> Initialized -> {Enabled <-> Disabled}
/// -> Cleaned-up`. The manager guarantees ordering: `cleanup` is called at
/// most once and never while enabled, and nothing is called after a failed
/// `initialize`. Redundant `enable`/`disable` calls are filtered by the
/// manager, so implementations need not be idempotent.
pub trait EditorPlugin: Send {
    /// Stable, non-empty identifier
    fn name(&self) -> &str;

    /// Display version string
    fn version(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Prepare the plugin for use
    fn initialize(&mut self) -> PluginResult<()>;

    /// Release plugin resources; terminal
    fn cleanup(&mut self);

    /// Start the plugin's behaviour
    fn enable(&mut self);

    /// Stop the plugin's behaviour
    fn disable(&mut self);

    /// Whether the plugin considers itself enabled
    fn is_enabled(&self) -> bool;
}

/// Owning wrapper around an instance produced by a module's creation entry point.
///
/// Dropping it releases the instance through the module's destruction entry
/// point when one was exported, otherwise by freeing the box on the host side.
/// The module that produced it must stay mapped until the drop completes.
pub struct PluginInstance {
    raw: NonNull<PluginBox>,
    destroy: Option<DestroyPluginFn>,
}

// The boxed plugin is `Send` by the trait bound; the wrapper only adds an address.
unsafe impl Send for PluginInstance {}

impl PluginInstance {
    /// Take ownership of a pointer returned by a creation entry point.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a pointer produced by a [`CreatePluginFn`] that
    /// follows this module's ABI, not yet released, and `destroy` must be the
    /// matching destruction entry point of the same module.
    pub unsafe fn from_raw(raw: *mut PluginBox, destroy: Option<DestroyPluginFn>) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw, destroy })
    }

    /// Wrap a host-side plugin, as if produced by a module without a destructor
    pub fn from_box(plugin: PluginBox) -> Self {
        let raw = NonNull::from(Box::leak(Box::new(plugin)));
        Self { raw, destroy: None }
    }

    /// Borrow the plugin
    pub fn plugin(&self) -> &dyn EditorPlugin {
        // SAFETY: `raw` is valid and uniquely owned until drop.
        unsafe { &**self.raw.as_ref() }
    }

    /// Borrow the plugin mutably
    pub fn plugin_mut(&mut self) -> &mut dyn EditorPlugin {
        // SAFETY: `raw` is valid and uniquely owned until drop.
        unsafe { &mut **self.raw.as_mut() }
    }

    /// Whether the originating module exported a destruction entry point
    pub fn has_module_destructor(&self) -> bool {
        self.destroy.is_some()
    }
}

impl Drop for PluginInstance {
    fn drop(&mut self) {
        match self.destroy {
            // SAFETY: the pointer came from the same module's creation entry point.
            Some(destroy) => unsafe { destroy(self.raw.as_ptr()) },
            // SAFETY: the pointer is an unreleased `Box<PluginBox>`.
            None => unsafe { drop(Box::from_raw(self.raw.as_ptr())) },
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.plugin().name())
            .field("module_destructor", &self.destroy.is_some())
            .finish()
    }
}

/// Export the creation and destruction entry points for a plugin type.
///
/// Takes the plugin type and a zero-argument constructor path. A panic in the
/// constructor is caught and reported to the host as a null instance.
#[macro_export]
macro_rules! declare_plugin {
    ($plugin_type:ty, $constructor:path) => {
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn quill_create_plugin() -> *mut $crate::plugin::PluginBox {
            match ::std::panic::catch_unwind(|| {
                let plugin: $plugin_type = $constructor();
                let boxed: $crate::plugin::PluginBox = ::std::boxed::Box::new(plugin);
                boxed
            }) {
                Ok(boxed) => ::std::boxed::Box::into_raw(::std::boxed::Box::new(boxed)),
                Err(_) => ::std::ptr::null_mut(),
            }
        }

        /// # Safety
        ///
        /// `plugin` must be null or a pointer returned by `quill_create_plugin`.
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub unsafe extern "C" fn quill_destroy_plugin(plugin: *mut $crate::plugin::PluginBox) {
            if !plugin.is_null() {
                drop(::std::boxed::Box::from_raw(plugin));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counted {
        drops: Arc<AtomicUsize>,
        enabled: bool,
    }

    impl EditorPlugin for Counted {
        fn name(&self) -> &str { "counted" }
        fn version(&self) -> &str { "0.1.0" }
        fn description(&self) -> &str { "Counts drops" }
        fn initialize(&mut self) -> PluginResult<()> { Ok(()) }
        fn cleanup(&mut self) {}
        fn enable(&mut self) { self.enabled = true; }
        fn disable(&mut self) { self.enabled = false; }
        fn is_enabled(&self) -> bool { self.enabled }
    }

    impl Drop for Counted {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_null_pointer_is_rejected() {
        let instance = unsafe { PluginInstance::from_raw(std::ptr::null_mut(), None) };
        assert!(instance.is_none());
    }

    #[test]
    fn test_instance_dispatch_and_drop() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut instance = PluginInstance::from_box(Box::new(Counted {
            drops: Arc::clone(&drops),
            enabled: false,
        }));

        assert_eq!(instance.plugin().name(), "counted");
        assert!(!instance.has_module_destructor());

        instance.plugin_mut().enable();
        assert!(instance.plugin().is_enabled());

        drop(instance);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
