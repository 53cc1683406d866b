//! Implementation of the `einsatzmonitor config` command.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct ConfigArgs {}

pub async fn execute(_args: ConfigArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let mut config = ConfigLoader::load_from_file(config_path)?;
    // The effective config is safe to print everywhere but the password.
    config.dashboard.password = "***".to_string();

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", style("Einsatzmonitor Configuration").bold());
        println!("============================");
        println!("Config file:          {}", config_path.display());
        println!();
        println!("Poll interval (s):    {}", config.monitor.poll_interval_secs);
        println!("Alarm window (s):     {}", config.monitor.alarm_duration_secs);
        println!("Notify on failure:    {}", config.monitor.notify_on_failure);
        println!("Notify on start:      {}", config.monitor.notify_on_start);
        println!();
        println!("Dashboard API:        {}", config.dashboard.base_url);
        println!("Dashboard (browser):  {}", config.dashboard.dashboard_base);
        println!("Customer id:          {}", config.dashboard.customer_id);
        println!("Username:             {}", config.dashboard.username);
        println!("Show infos:           {}", config.dashboard.show_infos);
        println!("HTTP timeout (s):     {}", config.dashboard.http_timeout_secs);
        println!();
        println!("CEC backend:          {:?}", config.cec.backend);
        println!("CEC binary:           {}", config.cec.binary);
        println!("CEC device id:        {}", config.cec.device_id);
        println!(
            "CEC device name:      {}",
            config.cec.device_name.as_deref().unwrap_or("-")
        );
        println!("Command timeout (s):  {}", config.cec.command_timeout_secs);
        println!("State cache (s):      {}", config.cec.state_cache_secs);
        println!();
        println!("Browser binary:       {}", config.browser.binary);
        println!("Browser display:      {}", config.browser.display);
        println!("Browser profile:      {}", config.browser.profile_dir);
        println!(
            "Terminate timeout (s): {}",
            config.browser.terminate_timeout_secs
        );
        println!();
        println!(
            "Webhook:              {}",
            config.notify.webhook_url.as_deref().unwrap_or("disabled")
        );
        println!("Log level:            {}", config.logging.level);
        println!("Log format:           {}", config.logging.format);
        println!(
            "Log directory:        {}",
            config.logging.directory.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
