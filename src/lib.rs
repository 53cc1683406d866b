//! Einsatzmonitor - alarm dashboard station supervisor
//!
//! Einsatzmonitor keeps a fire station's alarm dashboard ready: it polls the
//! blaulichtSMS dashboard API for active alarms, drives the station display
//! over HDMI CEC to match, and keeps a kiosk-mode Chromium on the dashboard
//! page, restarting it when it dies.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the ports the monitor
//!   is written against
//! - **Adapters Layer** (`adapters`): CEC transport, dashboard client,
//!   kiosk browser and notification sink implementations
//! - **Service Layer** (`services`): The supervisory monitor loop
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use einsatzmonitor::infrastructure::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     // Wire the adapters and run the monitor
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AlarmRecord, CecBackendKind, Config, DashboardFeed, LoggingConfig, MonitorConfig, PowerState,
};
pub use domain::ports::{AlarmSource, DeviceController, KioskBrowser, Notifier, NullNotifier};
pub use domain::{BrowserError, DashboardError, DeviceError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AlarmMonitor, MonitorDaemonConfig, MonitorHandle, MonitorStatus};
