//! The line-numbers plugin built as a real shared library and driven through `NativeLoader`

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use quill::plugin::{derive_plugin_name, PluginManager};

/// Build `plugins/line-numbers` into a private target directory and return the library path
fn build_line_numbers() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("native-plugins");
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());

    let status = Command::new(cargo)
        .args(["build", "--quiet", "-p", "line-numbers"])
        .arg("--manifest-path").arg(&manifest)
        .arg("--target-dir").arg(&target_dir)
        .status()
        .expect("Failed to run cargo");
    assert!(status.success(), "Building line-numbers failed");

    target_dir.join("debug").join(format!(
        "{}line_numbers{}",
        env::consts::DLL_PREFIX,
        env::consts::DLL_SUFFIX
    ))
}

#[test]
fn test_native_plugin_scan_enable_unload_reload() {
    let library = build_line_numbers();
    assert!(library.is_file(), "Missing build output: {}", library.display());

    let plugin_dir = tempdir().expect("Failed to create temp directory");
    let installed = plugin_dir.path().join(library.file_name().expect("library has a file name"));
    fs::copy(&library, &installed).expect("Failed to install plugin");
    fs::write(plugin_dir.path().join("README.md"), "line numbers").expect("Failed to write README");
    fs::write(plugin_dir.path().join("line_numbers.toml"), "").expect("Failed to write settings file");

    let name = derive_plugin_name(&installed).expect("plugin file has a stem");
    let mut manager = PluginManager::new();

    assert_eq!(manager.scan_plugin_directory(plugin_dir.path()), 1);
    assert_eq!(manager.plugin_list(), vec![name.clone()]);

    let info = manager.plugin_info(&name).expect("plugin should be registered");
    assert_eq!(info.reported_name, "line-numbers");
    assert_eq!(info.version, "0.1.0");
    assert!(!info.enabled);

    manager.enable_plugin(&name).unwrap();
    assert!(manager.is_plugin_enabled(&name));
    assert!(manager.get_plugin(&name).unwrap().is_enabled());

    manager.unload_plugin(&name).unwrap();
    assert!(!manager.is_plugin_loaded(&name));

    assert_eq!(manager.load_plugin(&installed).unwrap(), name);
    assert!(!manager.is_plugin_enabled(&name));
    assert_eq!(manager.unload_all(), 1);
}
