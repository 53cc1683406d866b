//! Command line interface.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::infrastructure::config::DEFAULT_CONFIG_PATH;

#[derive(Parser)]
#[command(name = "einsatzmonitor")]
#[command(about = "Einsatzmonitor - alarm dashboard station supervisor", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the monitor daemon
    Run(commands::run::RunArgs),

    /// Run a single monitor cycle, report it, then release the station
    Tick(commands::tick::TickArgs),

    /// Drive the display over HDMI CEC by hand
    Device(commands::device::DeviceArgs),

    /// Show the effective configuration
    Config(commands::config::ConfigArgs),

    /// Write a starter configuration file
    Init(commands::init::InitArgs),
}

/// Print a command error in the requested format and exit non-zero.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let output = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
