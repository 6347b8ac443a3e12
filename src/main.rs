use std::io::{self, IsTerminal};
use std::process;
use anyhow::Result;
use log::{error, info};
use quill::{app, cli, logging};
use quill::plugin::PluginManager;

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();

    cli::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let settings = app::resolve_plugin_settings(&args, &config_manager)?;
    let options = app::HostOptions {
        info: args.info.clone(),
        json: args.json,
        colours: !args.no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal(),
    };

    let mut manager = PluginManager::new();
    let summary = app::run_host(&mut manager, &settings, &options, &mut io::stdout().lock())?;
    info!(
        "Session finished: {} discovered, {} enabled, {} unloaded",
        summary.discovered, summary.enabled, summary.unloaded
    );

    Ok(())
}
