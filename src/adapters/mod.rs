//! Adapters for external systems.

pub mod browser;
pub mod cec;
pub mod dashboard;
pub mod notify;
