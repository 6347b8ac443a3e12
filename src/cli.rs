use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

/// Plugin host for the quill text editor
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Discover, load and manage quill editor plugins")]
#[command(version)]
pub struct Args {
    /// Directory scanned for plugin modules
    #[arg(long, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Enable a plugin after discovery (repeatable)
    #[arg(long, value_name = "NAME")]
    pub enable: Vec<String>,

    /// Disable a plugin after discovery (repeatable)
    #[arg(long, value_name = "NAME")]
    pub disable: Vec<String>,

    /// Show details for a single plugin
    #[arg(long, value_name = "NAME")]
    pub info: Option<String>,

    /// Print plugin information as JSON
    #[arg(long)]
    pub json: bool,

    /// File holding persisted plugin state
    #[arg(long, value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Write enabled/disabled state back before exit
    #[arg(long)]
    pub save_state: bool,

    /// Neither read nor write persisted plugin state
    #[arg(long)]
    pub no_state: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        crate::logging::parse_log_level(level)
            .map_err(|_| anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace, off", level
            ))?;
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if args.no_state && (args.save_state || args.state_file.is_some()) {
        return Err(anyhow::anyhow!(
            "--no-state cannot be combined with --save-state or --state-file"
        ));
    }

    if let Some(name) = args.enable.iter().find(|name| args.disable.contains(name)) {
        return Err(anyhow::anyhow!(
            "Plugin '{}' cannot be both enabled and disabled", name
        ));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}
