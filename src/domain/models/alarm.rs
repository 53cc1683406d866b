//! Dashboard API wire models.
//!
//! These structs map to the blaulichtSMS dashboard API v1 JSON payloads.
//! They are used by the dashboard adapter and the monitor's activity
//! policy; fields the monitor does not interpret are kept opaque.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format used by the alarm feed (UTC with fractional seconds),
/// e.g. `2024-05-17T19:03:12.000000Z`.
pub const ALARM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Request body for `POST {base_url}login`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Numeric customer identifier.
    pub customer_id: String,
    /// Dashboard account username.
    pub username: String,
    /// Dashboard account password.
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Session token; absent or empty means the login was rejected.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A single alarm record from the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmRecord {
    /// Opaque alarm identifier.
    pub alarm_id: String,
    /// Raw alarm timestamp in [`ALARM_DATE_FORMAT`].
    pub alarm_date: String,
}

impl AlarmRecord {
    /// Parse the feed timestamp; `None` when malformed.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(&self.alarm_date, ALARM_DATE_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Stateless activity test: the record is active iff its timestamp lies
    /// within `window` of `now`, boundary inclusive. Future-dated records
    /// count as active. Malformed timestamps never do.
    pub fn is_active_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.parsed_date().is_some_and(|date| now - date <= window)
    }
}

/// Response body of `GET {base_url}{session_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardFeed {
    /// Alarm records, newest first as delivered by the API.
    #[serde(default)]
    pub alarms: Vec<AlarmRecord>,
    /// Informational records; displayed by the dashboard, not interpreted
    /// by the monitor.
    #[serde(default)]
    pub infos: Vec<serde_json::Value>,
}
