//! Webhook notification sink.
//!
//! Posts plain-text monitor messages to a configured HTTP endpoint. The
//! sink is fire-and-forget by contract: delivery failures are logged here
//! and never reach the monitor loop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::domain::models::NotifyConfig;
use crate::domain::ports::Notifier;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that POSTs `{"subject": .., "text": ..}` to a webhook.
pub struct WebhookNotifier {
    http: Client,
    url: String,
    subject: String,
}

impl WebhookNotifier {
    /// Build the notifier; `None` when no webhook URL is configured.
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        let url = config.webhook_url.clone()?;
        let http = Client::builder().timeout(SEND_TIMEOUT).build().ok()?;
        Some(Self { http, url, subject: config.subject.clone() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send_message(&self, text: &str) {
        let body = serde_json::json!({
            "subject": self.subject,
            "text": text,
        });
        match self.http.post(&self.url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(status = resp.status().as_u16(), "Notification delivered");
            }
            Ok(resp) => {
                warn!(
                    status = resp.status().as_u16(),
                    "Notification endpoint answered with an error"
                );
            }
            Err(err) => {
                warn!(error = %err, "Could not deliver notification");
            }
        }
    }
}
