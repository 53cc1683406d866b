//! Implementation of the `einsatzmonitor device` command.
//!
//! Manual HDMI CEC control for bring-up and troubleshooting, using the
//! same adapter and configuration as the daemon.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use crate::adapters::cec::CecDevice;
use crate::domain::models::PowerState;
use crate::domain::ports::DeviceController;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;

#[derive(Args, Debug)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    /// Power the display on and make this source active
    On,
    /// Put the display into standby
    Standby,
    /// Query the display's power status
    Status,
    /// List every device on the CEC bus
    Scan,
}

pub async fn execute(args: DeviceArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(config_path)?;
    let _logger = LoggerImpl::init(&config.logging)?;

    let mut device = CecDevice::from_config(&config.cec);
    if let Some(ref name) = config.cec.device_name {
        device.discover_device(name).await?;
    }

    match args.command {
        DeviceCommand::On => {
            device.power_on().await?;
            if json_mode {
                let output = serde_json::json!({
                    "action": "power_on",
                    "device_id": device.device_id(),
                    "success": true
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Display {} powered on", device.device_id());
            }
        }
        DeviceCommand::Standby => {
            device.standby().await?;
            if json_mode {
                let output = serde_json::json!({
                    "action": "standby",
                    "device_id": device.device_id(),
                    "success": true
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Display {} put into standby", device.device_id());
            }
        }
        DeviceCommand::Status => {
            let state = device.power_status().await?;
            if json_mode {
                let output = serde_json::json!({
                    "device_id": device.device_id(),
                    "power_status": state.as_str()
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let rendered = match state {
                    PowerState::On => style(state.as_str()).green(),
                    PowerState::Standby => style(state.as_str()).yellow(),
                    PowerState::Unknown => style(state.as_str()).dim(),
                };
                println!("Display {} is {}", device.device_id(), rendered);
            }
        }
        DeviceCommand::Scan => {
            let lines = device.scan().await?;
            if json_mode {
                let output = serde_json::json!({ "scan": lines });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else if lines.is_empty() {
                println!("No devices answered on the CEC bus");
            } else {
                for line in &lines {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}
