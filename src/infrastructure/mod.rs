//! Infrastructure layer module
//!
//! This module contains the supporting machinery around the monitor:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
