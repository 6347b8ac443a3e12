//! Enable/disable/unload transitions and teardown ordering

use crate::plugin::manager::PluginManager;
use crate::plugin::error::PluginError;
use super::mock_plugins::*;

fn manager_with(modules: &[(&str, MockModule)]) -> PluginManager<MockModuleLoader> {
    let loader = modules.iter().fold(MockModuleLoader::new(), |loader, (path, module)| {
        loader.with_module(path, module.clone())
    });
    take_events();
    PluginManager::with_loader(loader)
}

#[test]
fn test_loaded_plugin_starts_disabled() {
    let mut manager = manager_with(&[("/plugins/syntax.so", MockModule::plugin("syntax"))]);

    let name = manager.load_plugin("/plugins/syntax.so").unwrap();
    assert_eq!(name, "syntax");
    assert!(manager.is_plugin_loaded("syntax"));
    assert!(!manager.is_plugin_enabled("syntax"));
    assert!(!manager.get_plugin("syntax").unwrap().is_enabled());
    assert_eq!(take_events(), vec!["syntax:initialize"]);
}

#[test]
fn test_enable_is_idempotent() {
    let mut manager = manager_with(&[("/plugins/autosave.so", MockModule::plugin("autosave"))]);
    manager.load_plugin("/plugins/autosave.so").unwrap();
    take_events();

    manager.enable_plugin("autosave").unwrap();
    manager.enable_plugin("autosave").unwrap();

    assert!(manager.is_plugin_enabled("autosave"));
    assert!(manager.get_plugin("autosave").unwrap().is_enabled());
    assert_eq!(take_events(), vec!["autosave:enable"]);
}

#[test]
fn test_disable_never_enabled_is_noop() {
    let mut manager = manager_with(&[("/plugins/terminal.so", MockModule::plugin("terminal"))]);
    manager.load_plugin("/plugins/terminal.so").unwrap();
    take_events();

    manager.disable_plugin("terminal").unwrap();

    assert!(!manager.is_plugin_enabled("terminal"));
    assert!(take_events().is_empty());
}

#[test]
fn test_enable_disable_round() {
    let mut manager = manager_with(&[("/plugins/terminal.so", MockModule::plugin("terminal"))]);
    manager.load_plugin("/plugins/terminal.so").unwrap();
    take_events();

    manager.enable_plugin("terminal").unwrap();
    manager.disable_plugin("terminal").unwrap();
    manager.disable_plugin("terminal").unwrap();

    assert!(!manager.is_plugin_enabled("terminal"));
    assert_eq!(take_events(), vec!["terminal:enable", "terminal:disable"]);
}

#[test]
fn test_unload_enabled_plugin_disables_before_cleanup() {
    let mut manager = manager_with(&[("/plugins/line_numbers.so", MockModule::plugin("line_numbers"))]);
    let log = manager.loader().log();
    manager.load_plugin("/plugins/line_numbers.so").unwrap();
    manager.enable_plugin("line_numbers").unwrap();
    take_events();

    manager.unload_plugin("line_numbers").unwrap();

    assert!(!manager.is_plugin_loaded("line_numbers"));
    assert!(manager.get_plugin("line_numbers").is_none());
    assert_eq!(
        take_events(),
        vec![
            "line_numbers:disable",
            "line_numbers:cleanup",
            "module:destroy",
            "line_numbers:drop",
            "unmap:line_numbers",
        ]
    );
    assert_eq!(log.lock().unwrap().outstanding(), 0);
}

#[test]
fn test_unload_disabled_plugin_skips_disable() {
    let mut manager = manager_with(&[("/plugins/syntax.so", MockModule::plugin("syntax"))]);
    manager.load_plugin("/plugins/syntax.so").unwrap();
    take_events();

    manager.unload_plugin("syntax").unwrap();

    let events = take_events();
    assert!(!events.contains(&"syntax:disable".to_string()));
    assert_eq!(events.first().map(String::as_str), Some("syntax:cleanup"));
    assert_eq!(events.last().map(String::as_str), Some("unmap:syntax"));
}

#[test]
fn test_operations_on_missing_name_fail_without_side_effects() {
    let mut manager = manager_with(&[("/plugins/autosave.so", MockModule::plugin("autosave"))]);
    manager.load_plugin("/plugins/autosave.so").unwrap();
    manager.enable_plugin("autosave").unwrap();
    take_events();

    assert!(matches!(manager.enable_plugin("ghost"), Err(PluginError::PluginNotFound { .. })));
    assert!(matches!(manager.disable_plugin("ghost"), Err(PluginError::PluginNotFound { .. })));
    assert!(matches!(manager.unload_plugin("ghost"), Err(PluginError::PluginNotFound { .. })));

    assert!(manager.is_plugin_loaded("autosave"));
    assert!(manager.is_plugin_enabled("autosave"));
    assert_eq!(manager.plugin_list(), vec!["autosave".to_string()]);
    assert!(take_events().is_empty());
}

#[test]
fn test_host_frees_instance_without_module_destructor() {
    let mut manager = manager_with(&[("/plugins/bare.so", MockModule::without_destructor("bare"))]);
    manager.load_plugin("/plugins/bare.so").unwrap();
    take_events();

    manager.unload_plugin("bare").unwrap();
    assert_eq!(take_events(), vec!["bare:cleanup", "bare:drop", "unmap:bare"]);
}

#[test]
fn test_drop_tears_down_every_plugin() {
    let mut manager = manager_with(&[
        ("/plugins/syntax.so", MockModule::plugin("syntax")),
        ("/plugins/autosave.so", MockModule::plugin("autosave")),
        ("/plugins/terminal.so", MockModule::plugin("terminal")),
    ]);
    let log = manager.loader().log();
    for path in ["/plugins/syntax.so", "/plugins/autosave.so", "/plugins/terminal.so"] {
        manager.load_plugin(path).unwrap();
    }
    manager.enable_plugin("autosave").unwrap();
    take_events();

    drop(manager);

    let events = take_events();
    for name in ["syntax", "autosave", "terminal"] {
        assert!(events.contains(&format!("{}:cleanup", name)), "{} not cleaned up", name);
        assert!(events.contains(&format!("unmap:{}", name)), "{} not unmapped", name);
    }
    let disable = events.iter().position(|e| e == "autosave:disable").unwrap();
    let cleanup = events.iter().position(|e| e == "autosave:cleanup").unwrap();
    assert!(disable < cleanup);
    assert!(!events.contains(&"syntax:disable".to_string()));

    let log = log.lock().unwrap();
    assert_eq!(log.mapped.len(), 3);
    assert_eq!(log.outstanding(), 0);
}

#[test]
fn test_unload_all_reports_count() {
    let mut manager = manager_with(&[
        ("/plugins/syntax.so", MockModule::plugin("syntax")),
        ("/plugins/autosave.so", MockModule::plugin("autosave")),
    ]);
    manager.load_plugin("/plugins/syntax.so").unwrap();
    manager.load_plugin("/plugins/autosave.so").unwrap();

    assert_eq!(manager.unload_all(), 2);
    assert_eq!(manager.plugin_count(), 0);
    assert_eq!(manager.unload_all(), 0);
}

#[test]
fn test_plugin_info_reflects_state() {
    let mut manager = manager_with(&[("/plugins/line_numbers.so", MockModule::plugin("Line Numbers"))]);
    manager.load_plugin("/plugins/line_numbers.so").unwrap();
    manager.enable_plugin("line_numbers").unwrap();

    let info = manager.plugin_info("line_numbers").unwrap();
    assert_eq!(info.name, "line_numbers");
    assert_eq!(info.reported_name, "Line Numbers");
    assert_eq!(info.version, "1.0.0");
    assert_eq!(info.path, std::path::PathBuf::from("/plugins/line_numbers.so"));
    assert!(info.enabled);

    assert_eq!(manager.plugin_infos().len(), 1);
    assert_eq!(manager.enabled_count(), 1);
    assert!(manager.plugin_info("missing").is_none());
}

#[test]
fn test_get_plugin_mut_dispatches_to_instance() {
    let mut manager = manager_with(&[("/plugins/syntax.so", MockModule::plugin("syntax"))]);
    manager.load_plugin("/plugins/syntax.so").unwrap();
    take_events();

    let plugin = manager.get_plugin_mut("syntax").unwrap();
    plugin.enable();
    assert!(plugin.is_enabled());
    assert_eq!(take_events(), vec!["syntax:enable"]);

    // bookkeeping flag only changes through the manager
    assert!(!manager.is_plugin_enabled("syntax"));
}
