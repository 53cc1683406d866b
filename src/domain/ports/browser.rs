//! Kiosk browser port - interface for the dashboard display process.

use async_trait::async_trait;

use crate::domain::errors::BrowserError;

/// Trait for supervising the kiosk browser process.
#[async_trait]
pub trait KioskBrowser: Send + Sync {
    /// Spawn the browser pointed at `url`, replacing any previous child.
    async fn start(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Non-blocking liveness check of the current child.
    fn is_alive(&mut self) -> bool;

    /// Restart the browser if it is not running.
    ///
    /// Returns `Ok(true)` when a new process was started, `Ok(false)` when
    /// the existing one was still alive. At most one spawn per death.
    async fn ensure_alive(&mut self, url: &str) -> Result<bool, BrowserError>;

    /// Request graceful termination, escalating after a bounded wait.
    /// Idempotent when nothing is running.
    async fn terminate(&mut self);
}
