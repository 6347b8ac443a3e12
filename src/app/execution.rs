//! Plugin host execution: discovery, state, output and teardown

use std::io::Write;
use anyhow::{Context, Result};
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use log::{debug, info, warn};
use crate::plugin::{ModuleLoader, PluginInfo, PluginManager, PluginSettings};

/// How the host reports plugins
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    /// Report a single plugin instead of the full list
    pub info: Option<String>,
    pub json: bool,
    pub colours: bool,
}

/// What a host run did
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostSummary {
    pub discovered: usize,
    pub restored: usize,
    pub enabled: usize,
    pub state_saved: bool,
    pub unloaded: usize,
}

/// Run one host session against `manager`, writing the report to `out`
pub fn run_host<L: ModuleLoader, W: Write>(
    manager: &mut PluginManager<L>,
    settings: &PluginSettings,
    options: &HostOptions,
    out: &mut W,
) -> Result<HostSummary> {
    let mut summary = HostSummary {
        discovered: manager.scan_plugin_directory(&settings.directory),
        ..HostSummary::default()
    };
    info!("Discovered {} plugin(s) in {}", summary.discovered, settings.directory.display());

    if let Some(state_file) = &settings.state_file {
        match manager.load_plugin_config(state_file) {
            Ok(applied) => summary.restored = applied,
            Err(e) => warn!("Ignoring plugin state from {}: {}", state_file.display(), e),
        }
    }

    for name in &settings.enable {
        if let Err(e) = manager.enable_plugin(name) {
            warn!("Cannot enable {}: {}", name, e);
        }
    }
    for name in &settings.disable {
        if let Err(e) = manager.disable_plugin(name) {
            warn!("Cannot disable {}: {}", name, e);
        }
    }
    summary.enabled = manager.enabled_count();

    let report = write_report(manager, options, out);

    let saved = match (&settings.state_file, settings.save_state) {
        (Some(state_file), true) => manager.save_plugin_config(state_file)
            .with_context(|| format!("Failed to save plugin state to {}", state_file.display()))
            .map(|_| true),
        (None, true) => {
            debug!("No state file configured, skipping save");
            Ok(false)
        }
        (_, false) => Ok(false),
    };

    summary.unloaded = manager.unload_all();
    report?;
    summary.state_saved = saved?;

    debug!("Host summary: {:?}", summary);
    Ok(summary)
}

fn write_report<L: ModuleLoader, W: Write>(
    manager: &PluginManager<L>,
    options: &HostOptions,
    out: &mut W,
) -> Result<()> {
    let infos = match &options.info {
        Some(name) => vec![manager.plugin_info(name)
            .ok_or_else(|| anyhow::anyhow!("Plugin not found: {}", name))?],
        None => manager.plugin_infos(),
    };

    if options.json {
        let json = match &options.info {
            Some(_) => serde_json::to_string_pretty(&infos[0]),
            None => serde_json::to_string_pretty(&infos),
        }.context("Failed to serialize plugin information")?;
        writeln!(out, "{}", json)?;
        return Ok(());
    }

    if options.info.is_some() {
        write_details(&infos[0], options.colours, out)?;
    } else {
        write_table(&infos, options.colours, out)?;
    }
    Ok(())
}

fn status_label(enabled: bool, colours: bool) -> String {
    let label = if enabled { "enabled" } else { "disabled" };
    match (colours, enabled) {
        (false, _) => label.to_string(),
        (true, true) => label.green().to_string(),
        (true, false) => label.dimmed().to_string(),
    }
}

/// Plugin table in prettytable's clean format, two spaces between columns
fn plugin_table(infos: &[PluginInfo], colours: bool) -> Table {
    let mut table = Table::new();
    let mut table_format = *format::consts::FORMAT_CLEAN;
    table_format.padding(0, 2);
    table.set_format(table_format);

    let title_cells: Vec<Cell> = ["NAME", "STATUS", "VERSION", "DESCRIPTION"].iter()
        .map(|title| if colours {
            Cell::new(&title.bold().to_string())
        } else {
            Cell::new(title)
        })
        .collect();
    table.set_titles(Row::new(title_cells));

    for info in infos {
        table.add_row(Row::new(vec![
            Cell::new(&info.name),
            Cell::new(&status_label(info.enabled, colours)),
            Cell::new(&info.version),
            Cell::new(&info.description),
        ]));
    }
    table
}

fn write_table<W: Write>(infos: &[PluginInfo], colours: bool, out: &mut W) -> Result<()> {
    if infos.is_empty() {
        writeln!(out, "No plugins loaded")?;
        return Ok(());
    }

    write!(out, "{}", plugin_table(infos, colours))?;

    let enabled = infos.iter().filter(|info| info.enabled).count();
    writeln!(out, "{} plugin(s), {} enabled", infos.len(), enabled)?;
    Ok(())
}

fn write_details<W: Write>(info: &PluginInfo, colours: bool, out: &mut W) -> Result<()> {
    let title = if colours { info.name.bold().to_string() } else { info.name.clone() };
    writeln!(out, "{}", title)?;
    writeln!(out, "  Reported name: {}", info.reported_name)?;
    writeln!(out, "  Version:       {}", info.version)?;
    writeln!(out, "  Description:   {}", info.description)?;
    writeln!(out, "  Path:          {}", info.path.display())?;
    writeln!(out, "  Status:        {}", status_label(info.enabled, colours))?;
    Ok(())
}
