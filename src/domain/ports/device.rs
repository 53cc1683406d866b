//! Device controller port - interface for display power control.

use async_trait::async_trait;

use crate::domain::errors::DeviceError;

/// Trait for display power control implementations.
///
/// The monitor wants three things from the display: make sure it is on and
/// showing this input, put it into standby, and find out which of the two
/// it is in. Implementations own whatever protocol state that takes.
#[async_trait]
pub trait DeviceController: Send + Sync {
    /// Get the backend name for logs.
    fn name(&self) -> &'static str;

    /// Power the display on and select this HDMI input as source.
    ///
    /// A no-op when the device is already believed on: two consecutive
    /// calls issue at most one hardware command sequence.
    async fn power_on(&mut self) -> Result<(), DeviceError>;

    /// Put the display into standby. No-op when already believed off.
    async fn standby(&mut self) -> Result<(), DeviceError>;

    /// Query the display's power state.
    ///
    /// `Ok` carries a confirmed answer only; timeouts, channel loss and
    /// unparseable responses are errors, never a guessed boolean.
    async fn is_on(&mut self) -> Result<bool, DeviceError>;
}
