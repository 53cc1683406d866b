use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Config file consulted when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid poll_interval_secs: {0}. Must be positive")]
    InvalidPollInterval(u64),

    #[error("Invalid alarm_duration_secs: {0}. Must be positive")]
    InvalidAlarmDuration(u64),

    #[error("Missing credential: {0} must be set")]
    MissingCredential(&'static str),

    #[error("Invalid customer_id: '{0}'. Must be decimal digits only")]
    InvalidCustomerId(String),

    #[error("Invalid base_url: '{0}'. Must end with a trailing slash")]
    InvalidBaseUrl(String),

    #[error("Invalid {field}: {value}. Must be positive")]
    InvalidTimeout { field: &'static str, value: u64 },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default file location.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. config.yaml in the working directory
    /// 3. Environment variables (EINSATZMONITOR_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific file, with env overrides on top.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("EINSATZMONITOR_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate monitor timings
        if config.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(
                config.monitor.poll_interval_secs,
            ));
        }

        if config.monitor.alarm_duration_secs == 0 {
            return Err(ConfigError::InvalidAlarmDuration(
                config.monitor.alarm_duration_secs,
            ));
        }

        // Validate dashboard access
        if config.dashboard.customer_id.is_empty() {
            return Err(ConfigError::MissingCredential("dashboard.customer_id"));
        }

        if !config.dashboard.customer_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidCustomerId(
                config.dashboard.customer_id.clone(),
            ));
        }

        if config.dashboard.username.is_empty() {
            return Err(ConfigError::MissingCredential("dashboard.username"));
        }

        if config.dashboard.password.is_empty() {
            return Err(ConfigError::MissingCredential("dashboard.password"));
        }

        // Endpoints are joined by appending path segments
        if !config.dashboard.base_url.ends_with('/') {
            return Err(ConfigError::InvalidBaseUrl(
                config.dashboard.base_url.clone(),
            ));
        }

        if config.dashboard.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "dashboard.http_timeout_secs",
                value: config.dashboard.http_timeout_secs,
            });
        }

        // Validate CEC config
        if config.cec.binary.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "cec.binary cannot be empty".to_string(),
            ));
        }

        if config.cec.command_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "cec.command_timeout_secs",
                value: config.cec.command_timeout_secs,
            });
        }

        // Validate browser config
        if config.browser.binary.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "browser.binary cannot be empty".to_string(),
            ));
        }

        if config.browser.terminate_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout {
                field: "browser.terminate_timeout_secs",
                value: config.browser.terminate_timeout_secs,
            });
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
