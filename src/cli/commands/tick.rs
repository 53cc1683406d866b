//! Implementation of the `einsatzmonitor tick` command.
//!
//! One full monitor cycle as a smoke test: the browser comes up, the
//! display is driven to match the feed, the result is printed. The
//! station is released again before the command returns.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::warn;

use crate::adapters::browser::ChromiumBrowser;
use crate::adapters::cec::CecDevice;
use crate::adapters::dashboard::DashboardClient;
use crate::cli::output::{output, CommandOutput};
use crate::domain::ports::{Notifier, NullNotifier};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use crate::services::{AlarmMonitor, MonitorDaemonConfig, MonitorStatus};

#[derive(Args, Debug)]
pub struct TickArgs {}

#[derive(Debug, serde::Serialize)]
pub struct TickOutput {
    pub status: MonitorStatus,
}

impl CommandOutput for TickOutput {
    fn to_human(&self) -> String {
        format!(
            "Cycle completed:\n  Alarm active:     {}\n  Device fault:     {}\n  Browser fault:    {}\n  Browser restarts: {}",
            self.status.alarm_active,
            self.status.device_fault,
            self.status.browser_fault,
            self.status.browser_restarts,
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(_args: TickArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(config_path)?;
    let _logger = LoggerImpl::init(&config.logging)?;

    let mut device = CecDevice::from_config(&config.cec);
    if let Some(ref name) = config.cec.device_name {
        if let Err(err) = device.discover_device(name).await {
            warn!(error = %err, "CEC bus scan failed, keeping configured device id");
        }
    }

    let alarms = DashboardClient::new(
        config.dashboard.clone(),
        std::time::Duration::from_secs(config.monitor.alarm_duration_secs),
    )?;
    let browser = ChromiumBrowser::new(config.browser.clone());
    // A single probe cycle never notifies.
    let notifier: Box<dyn Notifier> = Box::new(NullNotifier::new());

    let mut monitor = AlarmMonitor::new(
        MonitorDaemonConfig::from(&config.monitor),
        device,
        alarms,
        browser,
        notifier,
    );
    let handle = monitor.handle();

    monitor.run_cycle().await;
    let status = handle.status().await;
    monitor.shutdown().await;

    output(&TickOutput { status }, json_mode);
    Ok(())
}
