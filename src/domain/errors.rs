//! Domain errors for the einsatzmonitor daemon.

use thiserror::Error;

/// Errors raised by the HDMI CEC device adapter.
///
/// Every variant is transient from the monitor's point of view: the failed
/// command is reported, the device-unreachable fault is flagged, and the
/// next cycle retries.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CEC channel to the device closed")]
    ChannelClosed,

    #[error("Timed out after {timeout_secs}s waiting for a response to `{command}`")]
    Timeout { command: String, timeout_secs: u64 },

    #[error("No power status in the device response to `{command}`")]
    NoStatus { command: String },

    #[error("CEC I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the dashboard API client.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dashboard login failed: {0}")]
    SessionInit(String),

    #[error("Session rejected by the dashboard API (HTTP {status})")]
    SessionRejected { status: u16 },

    #[error("Dashboard API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Dashboard request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected dashboard response: {0}")]
    UnexpectedResponse(String),
}

impl DashboardError {
    /// Whether a feed request failed because the session id was not
    /// accepted (expired or revoked). The client re-logins once and
    /// retries such a request before giving up for the cycle.
    pub const fn is_session_rejected(&self) -> bool {
        matches!(self, Self::SessionRejected { .. })
    }

    /// Map a non-success feed response status. A 4xx means the server did
    /// not accept the session id; anything else is a server-side failure.
    pub fn from_feed_status(status: u16, message: String) -> Self {
        if (400..500).contains(&status) {
            Self::SessionRejected { status }
        } else {
            Self::Api { status, message }
        }
    }
}

/// Errors raised by the kiosk browser supervisor.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Browser process I/O error: {0}")]
    Io(#[from] std::io::Error),
}
