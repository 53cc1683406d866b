use serde::{Deserialize, Serialize};

/// Main configuration structure for the einsatzmonitor daemon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Monitor cycle cadence and notification toggles
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Dashboard API credentials and endpoints
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// HDMI CEC device control configuration
    #[serde(default)]
    pub cec: CecConfig,

    /// Kiosk browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Notification sink configuration
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Monitor loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Seconds between monitor cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Look-back window in which an alarm counts as active, in seconds
    #[serde(default = "default_alarm_duration_secs")]
    pub alarm_duration_secs: u64,

    /// Send a notification when a fault class is raised or cleared
    #[serde(default = "default_notify_on_failure")]
    pub notify_on_failure: bool,

    /// Send a start-up announcement when the daemon comes up
    #[serde(default)]
    pub notify_on_start: bool,
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_alarm_duration_secs() -> u64 {
    3600
}

const fn default_notify_on_failure() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            alarm_duration_secs: default_alarm_duration_secs(),
            notify_on_failure: default_notify_on_failure(),
            notify_on_start: false,
        }
    }
}

/// Dashboard API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardConfig {
    /// Base URL of the alarm dashboard API (trailing slash required)
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Base URL of the browser-facing dashboard
    #[serde(default = "default_dashboard_base")]
    pub dashboard_base: String,

    /// Numeric customer identifier
    #[serde(default)]
    pub customer_id: String,

    /// Dashboard account username
    #[serde(default)]
    pub username: String,

    /// Dashboard account password
    #[serde(default)]
    pub password: String,

    /// Include informational (non-alarm) records on the kiosk dashboard
    #[serde(default)]
    pub show_infos: bool,

    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.blaulichtsms.net/blaulicht/api/alarm/v1/dashboard/".to_string()
}

fn default_dashboard_base() -> String {
    "https://dashboard.blaulichtsms.net".to_string()
}

const fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            dashboard_base: default_dashboard_base(),
            customer_id: String::new(),
            username: String::new(),
            password: String::new(),
            show_infos: false,
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Which transport carries CEC commands to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CecBackendKind {
    /// One persistent `cec-client` process with a background stdout reader
    Channel,
    /// A fresh `cec-client -s` invocation per command
    OneShot,
}

/// HDMI CEC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CecConfig {
    /// Transport backend, chosen once at startup
    #[serde(default = "default_cec_backend")]
    pub backend: CecBackendKind,

    /// Path to the `cec-client` binary
    #[serde(default = "default_cec_binary")]
    pub binary: String,

    /// Base arguments passed to every `cec-client` invocation
    #[serde(default = "default_cec_args")]
    pub args: Vec<String>,

    /// Logical CEC address of the display (0 = TV)
    #[serde(default)]
    pub device_id: u8,

    /// Resolve the device id by OSD name at startup when set
    #[serde(default)]
    pub device_name: Option<String>,

    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// How long a confirmed power state stays believable, in seconds
    #[serde(default = "default_state_cache_secs")]
    pub state_cache_secs: u64,
}

const fn default_cec_backend() -> CecBackendKind {
    CecBackendKind::Channel
}

fn default_cec_binary() -> String {
    "cec-client".to_string()
}

fn default_cec_args() -> Vec<String> {
    vec!["-d".to_string(), "1".to_string()]
}

const fn default_command_timeout_secs() -> u64 {
    5
}

const fn default_state_cache_secs() -> u64 {
    5
}

impl Default for CecConfig {
    fn default() -> Self {
        Self {
            backend: default_cec_backend(),
            binary: default_cec_binary(),
            args: default_cec_args(),
            device_id: 0,
            device_name: None,
            command_timeout_secs: default_command_timeout_secs(),
            state_cache_secs: default_state_cache_secs(),
        }
    }
}

/// Kiosk browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BrowserConfig {
    /// Path to the browser binary
    #[serde(default = "default_browser_binary")]
    pub binary: String,

    /// X display the kiosk window opens on
    #[serde(default = "default_display")]
    pub display: String,

    /// Browser profile directory holding `Default/Preferences`
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,

    /// Additional flags appended to the fixed kiosk flag set
    #[serde(default)]
    pub extra_flags: Vec<String>,

    /// Seconds to wait for graceful exit before SIGKILL
    #[serde(default = "default_terminate_timeout_secs")]
    pub terminate_timeout_secs: u64,
}

fn default_browser_binary() -> String {
    "/usr/bin/chromium-browser".to_string()
}

fn default_display() -> String {
    ":0".to_string()
}

fn default_profile_dir() -> String {
    "~/.config/chromium".to_string()
}

const fn default_terminate_timeout_secs() -> u64 {
    10
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: default_browser_binary(),
            display: default_display(),
            profile_dir: default_profile_dir(),
            extra_flags: vec![],
            terminate_timeout_secs: default_terminate_timeout_secs(),
        }
    }
}

/// Notification sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotifyConfig {
    /// Webhook endpoint receiving notification messages; disabled when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Subject line included with every message
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_subject() -> String {
    "Einsatzmonitor".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            subject: default_subject(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rolling log files; stderr only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            directory: None,
        }
    }
}
