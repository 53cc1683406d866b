//! Dashboard API client.
//!
//! Speaks the blaulichtSMS dashboard API v1: a login yields a session id
//! that is both the GET path of the alarm feed and part of the kiosk URL.
//! The client caches the session, re-logins once per rejected request, and
//! answers feed trouble with "no active alarm" so a broken feed can never
//! switch the display on.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::domain::errors::DashboardError;
use crate::domain::models::{DashboardConfig, DashboardFeed, LoginRequest, LoginResponse};
use crate::domain::ports::AlarmSource;

/// Client for the alarm dashboard API.
pub struct DashboardClient {
    http: Client,
    config: DashboardConfig,
    alarm_window: chrono::Duration,
    session_id: Option<String>,
}

impl DashboardClient {
    /// Create a client. `alarm_window` is how far back an alarm timestamp
    /// may lie and still count as active.
    pub fn new(config: DashboardConfig, alarm_window: Duration) -> Result<Self, DashboardError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let alarm_window =
            chrono::Duration::from_std(alarm_window).unwrap_or(chrono::Duration::MAX);
        Ok(Self { http, config, alarm_window, session_id: None })
    }

    /// Log in and cache the fresh session id.
    async fn login(&mut self) -> Result<String, DashboardError> {
        let url = format!("{}login", self.config.base_url);
        let body = LoginRequest {
            customer_id: self.config.customer_id.clone(),
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        };
        debug!(customer_id = %body.customer_id, "Logging in to the dashboard API");

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DashboardError::SessionInit(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(DashboardError::SessionInit(format!("HTTP {status}: {text}")));
        }

        let login: LoginResponse = resp
            .json()
            .await
            .map_err(|e| DashboardError::SessionInit(format!("malformed login response: {e}")))?;
        match login.session_id {
            Some(id) if !id.is_empty() => {
                info!("Dashboard session established");
                self.session_id = Some(id.clone());
                Ok(id)
            }
            _ => Err(DashboardError::SessionInit(
                "login response carried no session id".to_string(),
            )),
        }
    }

    /// The cached session id, logging in when none is held.
    async fn session(&mut self) -> Result<String, DashboardError> {
        if let Some(id) = &self.session_id {
            return Ok(id.clone());
        }
        self.login().await
    }

    async fn fetch_feed_once(&self, session_id: &str) -> Result<DashboardFeed, DashboardError> {
        let url = format!("{}{}", self.config.base_url, session_id);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(DashboardError::from_feed_status(status, body));
        }
        resp.json::<DashboardFeed>()
            .await
            .map_err(|e| DashboardError::UnexpectedResponse(format!("malformed feed: {e}")))
    }

    /// Fetch the alarm feed.
    ///
    /// A rejected session triggers exactly one re-login and one retry; a
    /// second failure is returned to the caller (the next cycle starts
    /// over anyway).
    pub async fn fetch_feed(&mut self) -> Result<DashboardFeed, DashboardError> {
        let session_id = self.session().await?;
        match self.fetch_feed_once(&session_id).await {
            Err(err) if err.is_session_rejected() => {
                warn!(error = %err, "Dashboard session rejected, logging in again");
                self.session_id = None;
                let fresh = self.login().await?;
                self.fetch_feed_once(&fresh).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl AlarmSource for DashboardClient {
    async fn is_alarm_active(&mut self) -> bool {
        let feed = match self.fetch_feed().await {
            Ok(feed) => feed,
            Err(err) => {
                error!(error = %err, "Could not read the alarm feed, treating as no active alarm");
                return false;
            }
        };

        let now = Utc::now();
        for alarm in &feed.alarms {
            match alarm.parsed_date() {
                None => {
                    warn!(
                        alarm_id = %alarm.alarm_id,
                        alarm_date = %alarm.alarm_date,
                        "Ignoring alarm with malformed timestamp"
                    );
                }
                Some(_) if alarm.is_active_at(now, self.alarm_window) => {
                    debug!(alarm_id = %alarm.alarm_id, "Alarm inside the activity window");
                    return true;
                }
                Some(_) => {}
            }
        }
        false
    }

    async fn dashboard_url(&mut self) -> Result<String, DashboardError> {
        let session_id = self.session().await?;
        let base = self.config.dashboard_base.trim_end_matches('/');
        if self.config.show_infos {
            Ok(format!("{base}/{session_id}?showInfos=true"))
        } else {
            Ok(format!("{base}/{session_id}"))
        }
    }
}
