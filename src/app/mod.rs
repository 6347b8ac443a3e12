//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{
    load_configuration,
    configure_logging,
    resolve_plugin_settings,
};
pub use execution::{
    run_host,
    HostOptions,
    HostSummary,
};
