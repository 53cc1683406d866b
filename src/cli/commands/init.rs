//! Implementation of the `einsatzmonitor init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Starter configuration; sections left commented out keep the built-in
/// defaults. A section key without any settings would read as YAML null
/// instead of an empty section, so unused sections stay fully commented.
const STARTER_CONFIG: &str = r#"# Einsatzmonitor configuration.
# Commented sections show the built-in defaults.

dashboard:
  customer_id: "100000"
  username: dashboard-user
  password: change-me
  # base_url: https://api.blaulichtsms.net/blaulicht/api/alarm/v1/dashboard/
  # dashboard_base: https://dashboard.blaulichtsms.net
  # Include informational records on the kiosk dashboard.
  # show_infos: false
  # http_timeout_secs: 10

# monitor:
#   # Seconds between monitor cycles.
#   poll_interval_secs: 30
#   # How long after its alarm date an alarm keeps the display on, in seconds.
#   alarm_duration_secs: 3600
#   # Send a notification when a fault is raised or resolved.
#   notify_on_failure: true
#   # Announce daemon start through the notifier.
#   notify_on_start: false

# cec:
#   backend: channel            # channel | one_shot
#   binary: cec-client
#   args: ["-d", "1"]
#   # Logical CEC address of the display (0 = TV).
#   device_id: 0
#   # Resolve the device id by OSD name at startup.
#   device_name: TV
#   command_timeout_secs: 5
#   state_cache_secs: 5

# browser:
#   binary: /usr/bin/chromium-browser
#   display: ":0"
#   profile_dir: ~/.config/chromium
#   extra_flags: []
#   terminate_timeout_secs: 10

# notify:
#   webhook_url: https://example.test/hooks/einsatzmonitor
#   subject: Einsatzmonitor

# logging:
#   level: info                 # trace | debug | info | warn | error
#   format: pretty              # pretty | json
#   directory: /var/log/einsatzmonitor
"#;

pub async fn execute(args: InitArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite it.",
                config_path.display()
            ),
            config_path: config_path.to_path_buf(),
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(config_path, STARTER_CONFIG)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let output_data = InitOutput {
        success: true,
        message: format!(
            "Wrote starter configuration to {}. Fill in the dashboard credentials before running.",
            config_path.display()
        ),
        config_path: config_path.to_path_buf(),
    };
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_config_parses_with_valid_settings() {
        use crate::domain::models::Config;
        use crate::infrastructure::config::ConfigLoader;

        let config: Config =
            serde_yaml::from_str(STARTER_CONFIG).expect("starter config should parse");
        ConfigLoader::validate(&config).expect("starter config should validate");
        assert_eq!(config.dashboard.customer_id, "100000");
        assert_eq!(config.monitor.poll_interval_secs, 30);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "monitor: {}\n").await.unwrap();

        let args = InitArgs { force: false };
        execute(args, &path, false).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "monitor: {}\n");
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "stale\n").await.unwrap();

        let args = InitArgs { force: true };
        execute(args, &path, false).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("dashboard:"));
        assert!(content.contains("customer_id"));
    }
}
