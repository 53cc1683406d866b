//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that the adapters implement:
//! - `DeviceController`: display power control over HDMI CEC
//! - `AlarmSource`: the remote alarm feed and its session
//! - `KioskBrowser`: the dashboard display process
//! - `Notifier`: the plain-text notification sink
//!
//! These traits define the contracts that allow the monitor loop to be
//! independent of specific infrastructure implementations.

pub mod alarm_source;
pub mod browser;
pub mod device;
pub mod notifier;

pub use alarm_source::AlarmSource;
pub use browser::KioskBrowser;
pub use device::DeviceController;
pub use notifier::{Notifier, NullNotifier};
