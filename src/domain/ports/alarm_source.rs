//! Alarm source port - interface to the remote alarm feed.

use async_trait::async_trait;

use crate::domain::errors::DashboardError;

/// Trait for the remote feed that decides whether the display should be on.
#[async_trait]
pub trait AlarmSource: Send + Sync {
    /// Whether at least one alarm is currently active.
    ///
    /// Must not fail: feed problems are logged by the implementation and
    /// answered with `false`, so a broken feed can never switch the
    /// display on.
    async fn is_alarm_active(&mut self) -> bool;

    /// The session-scoped URL the kiosk browser should display.
    ///
    /// Logs in first when no valid session is held.
    async fn dashboard_url(&mut self) -> Result<String, DashboardError>;
}
