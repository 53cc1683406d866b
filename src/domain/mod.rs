//! Domain layer for the einsatzmonitor daemon
//!
//! This module contains core business logic and domain models.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{BrowserError, DashboardError, DeviceError};
