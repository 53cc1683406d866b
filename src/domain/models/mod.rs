pub mod alarm;
pub mod config;
pub mod power;

pub use alarm::{AlarmRecord, DashboardFeed, LoginRequest, LoginResponse, ALARM_DATE_FORMAT};
pub use config::{
    BrowserConfig, CecBackendKind, CecConfig, Config, DashboardConfig, LoggingConfig,
    MonitorConfig, NotifyConfig,
};
pub use power::PowerState;
