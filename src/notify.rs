//! Outcome notifications.
//!
//! Delivery is best-effort: a sink that fails is logged and otherwise
//! ignored, so notification trouble never changes the sync outcome.

use crate::error::{Error, Result};
use async_trait::async_trait;

/// A destination that can deliver a status message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sink: Send + Sync {
    /// Deliver one message; `success` selects the good/danger styling.
    async fn deliver(&self, text: &str, success: bool) -> Result<()>;
}

/// Slack incoming-webhook sink posting a colored attachment.
pub struct SlackWebhook {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackWebhook {
    /// Create a sink for the given webhook URL.
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }
}

#[async_trait]
impl Sink for SlackWebhook {
    async fn deliver(&self, text: &str, success: bool) -> Result<()> {
        let color = if success { "good" } else { "danger" };

        let payload = serde_json::json!({
            "attachments": [{ "color": color, "text": text }]
        });

        let response = self
            .client
            .patch(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(Error::Network(format!(
                "Slack returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Fan-out over the configured sinks. No sinks configured means every
/// notification is a silent no-op.
#[derive(Default)]
pub struct Notifier {
    sinks: Vec<Box<dyn Sink>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Deliver to every sink, logging failures instead of returning them.
    pub async fn notify(&self, text: &str, success: bool) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(text, success).await {
                tracing::warn!("Failed to deliver notification: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_slack_success_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(body_json(serde_json::json!({
                "attachments": [{ "color": "good", "text": "all fine" }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = SlackWebhook::new(mock_server.uri());
        sink.deliver("all fine", true).await.unwrap();
    }

    #[tokio::test]
    async fn test_slack_failure_payload_is_danger() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(body_json(serde_json::json!({
                "attachments": [{ "color": "danger", "text": "it broke" }]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let sink = SlackWebhook::new(mock_server.uri());
        sink.deliver("it broke", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_slack_non_200_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let sink = SlackWebhook::new(mock_server.uri());
        assert!(sink.deliver("anything", true).await.is_err());
    }

    #[tokio::test]
    async fn test_notifier_swallows_sink_failures() {
        let mut failing = MockSink::new();
        failing
            .expect_deliver()
            .times(1)
            .returning(|_, _| Err(Error::Network("sink down".to_string())));

        let mut notifier = Notifier::new();
        notifier.add_sink(Box::new(failing));

        // Must not panic or propagate.
        notifier.notify("message", true).await;
    }

    #[tokio::test]
    async fn test_notifier_without_sinks_is_noop() {
        let notifier = Notifier::new();
        notifier.notify("nobody listening", false).await;
    }
}
