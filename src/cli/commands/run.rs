//! Implementation of the `einsatzmonitor run` command.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;
use tracing::warn;

use crate::adapters::browser::ChromiumBrowser;
use crate::adapters::cec::CecDevice;
use crate::adapters::dashboard::DashboardClient;
use crate::adapters::notify::WebhookNotifier;
use crate::domain::ports::{Notifier, NullNotifier};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::LoggerImpl;
use crate::services::{AlarmMonitor, MonitorDaemonConfig};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured poll interval, in seconds
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
}

pub async fn execute(args: RunArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let mut config = ConfigLoader::load_from_file(config_path)?;
    if let Some(secs) = args.poll_interval_secs {
        config.monitor.poll_interval_secs = secs;
        ConfigLoader::validate(&config)?;
    }

    let _logger = LoggerImpl::init(&config.logging)?;

    if !json_mode {
        println!("{}", style("Starting Einsatzmonitor").bold());
        println!("   Poll interval: {}s", config.monitor.poll_interval_secs);
        println!("   Alarm window:  {}s", config.monitor.alarm_duration_secs);
        println!(
            "   CEC device:    {} (backend: {:?})",
            config.cec.device_id, config.cec.backend
        );
        println!("   Browser:       {}", config.browser.binary);
        println!();
    }

    let mut device = CecDevice::from_config(&config.cec);
    if let Some(ref name) = config.cec.device_name {
        // Discovery trouble is not fatal, the configured id still works.
        if let Err(err) = device.discover_device(name).await {
            warn!(error = %err, "CEC bus scan failed, keeping configured device id");
        }
    }

    let alarms = DashboardClient::new(
        config.dashboard.clone(),
        std::time::Duration::from_secs(config.monitor.alarm_duration_secs),
    )?;
    let browser = ChromiumBrowser::new(config.browser.clone());

    let notifier: Box<dyn Notifier> = match WebhookNotifier::from_config(&config.notify) {
        Some(webhook) => Box::new(webhook),
        None => {
            if config.notify.webhook_url.is_some() {
                warn!("Webhook notifier could not be built, notifications disabled");
            }
            Box::new(NullNotifier::new())
        }
    };

    let monitor = AlarmMonitor::new(
        MonitorDaemonConfig::from(&config.monitor),
        device,
        alarms,
        browser,
        notifier,
    );
    monitor.run().await;

    Ok(())
}
