//! CLI command implementations.

pub mod config;
pub mod device;
pub mod init;
pub mod run;
pub mod tick;
