//! Services implementing the supervisory behavior on top of the ports.

pub mod fault;
pub mod monitor;

pub use fault::{FaultFlag, FaultState, FaultTransition};
pub use monitor::{AlarmMonitor, MonitorDaemonConfig, MonitorHandle, MonitorStatus};
