//! Notification sink port.

use async_trait::async_trait;

/// Trait for the plain-text notification sink.
///
/// Delivery is fire-and-forget: implementations log failures and never
/// propagate them, so a broken sink cannot disturb the monitor loop.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the sink name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one plain-text message.
    async fn send_message(&self, text: &str);
}

#[async_trait]
impl Notifier for Box<dyn Notifier> {
    fn name(&self) -> &'static str {
        self.as_ref().name()
    }

    async fn send_message(&self, text: &str) {
        self.as_ref().send_message(text).await;
    }
}

/// A no-op notifier used when no sink is configured.
#[derive(Debug, Clone, Default)]
pub struct NullNotifier;

impl NullNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for NullNotifier {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn send_message(&self, text: &str) {
        tracing::debug!(message = %text, "No notification sink configured, dropping message");
    }
}
