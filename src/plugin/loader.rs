//! Module Loader
//!
//! Thin adapter over the host's dynamic-linking facility: map a shared
//! library, resolve exported entry points by exact name, unmap it. The
//! [`ModuleLoader`] trait is the seam the manager is generic over; the native
//! implementation is backed by `libloading` (`dlopen` / `LoadLibrary`).

use std::path::{Path, PathBuf};
use libloading::Library;
use log::{debug, warn};
use super::contract::{CreatePluginFn, DestroyPluginFn};
use super::error::{PluginError, PluginResult};

/// Primitive operations for bringing plugin modules in and out of the process.
///
/// Handles are owned values: [`unmap_library`](ModuleLoader::unmap_library)
/// consumes the handle, so each successful mapping is released at most once.
pub trait ModuleLoader {
    /// Opaque token for a mapped module
    type Handle;

    /// Map the file at `path` into the process.
    ///
    /// Fails if the file does not exist, is not a valid image for this
    /// platform, or has unresolved link-time dependencies.
    fn map_library(&self, path: &Path) -> PluginResult<Self::Handle>;

    /// Resolve a creation entry point by exact name
    fn resolve_create(&self, handle: &Self::Handle, symbol: &str) -> Option<CreatePluginFn>;

    /// Resolve a destruction entry point by exact name
    fn resolve_destroy(&self, handle: &Self::Handle, symbol: &str) -> Option<DestroyPluginFn>;

    /// Release the mapping
    fn unmap_library(&self, handle: Self::Handle);

    /// File extension of loadable modules, without the leading dot
    fn library_extension(&self) -> &str {
        std::env::consts::DLL_EXTENSION
    }
}

/// A shared library mapped through the platform loader
#[derive(Debug)]
pub struct NativeModule {
    library: Library,
    path: PathBuf,
}

impl NativeModule {
    /// Path the module was mapped from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up an exported symbol by exact name.
    ///
    /// # Safety
    ///
    /// `T` must match the actual type of the exported symbol, and the value
    /// must not be used after this module is unmapped.
    pub unsafe fn resolve_symbol<T: Copy>(&self, name: &str) -> Option<T> {
        match self.library.get::<T>(name.as_bytes()) {
            Ok(symbol) => Some(*symbol),
            Err(e) => {
                debug!("Symbol '{}' not resolved in {}: {}", name, self.path.display(), e);
                None
            }
        }
    }
}

/// Loader backed by the operating system's dynamic linker
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl NativeLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleLoader for NativeLoader {
    type Handle = NativeModule;

    fn map_library(&self, path: &Path) -> PluginResult<NativeModule> {
        if !path.is_file() {
            return Err(PluginError::mapping_failed(path, "file does not exist"));
        }

        // SAFETY: mapping runs the module's initialisers; plugins execute with
        // full host privileges.
        let library = unsafe { Library::new(path) }
            .map_err(|e| PluginError::mapping_failed(path, e.to_string()))?;

        debug!("Mapped library: {}", path.display());
        Ok(NativeModule {
            library,
            path: path.to_path_buf(),
        })
    }

    fn resolve_create(&self, handle: &NativeModule, symbol: &str) -> Option<CreatePluginFn> {
        // SAFETY: the entry point's signature is fixed by the plugin ABI.
        unsafe { handle.resolve_symbol::<CreatePluginFn>(symbol) }
    }

    fn resolve_destroy(&self, handle: &NativeModule, symbol: &str) -> Option<DestroyPluginFn> {
        // SAFETY: the entry point's signature is fixed by the plugin ABI.
        unsafe { handle.resolve_symbol::<DestroyPluginFn>(symbol) }
    }

    fn unmap_library(&self, handle: NativeModule) {
        let NativeModule { library, path } = handle;
        match library.close() {
            Ok(()) => debug!("Unmapped library: {}", path.display()),
            Err(e) => warn!("Failed to unmap library {}: {}", path.display(), e),
        }
    }
}
