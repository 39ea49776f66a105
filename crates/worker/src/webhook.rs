//! Webhook delivery: a single JSON POST per attempt.
//!
//! There is deliberately no retry here — the outbox dispatcher records a
//! failed entry and moves on; redelivery is an operator-driven status
//! reset on the outbox row.

use std::time::Duration;

use async_trait::async_trait;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("webhook_status_{0}")]
    Status(u16),
}

/// Delivers a JSON payload to an endpoint. Behind a trait so dispatcher
/// tests run without a network.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), WebhookError>;
}

/// Production sender with a pre-configured reqwest client.
pub struct HttpWebhookSender {
    client: reqwest::Client,
}

impl HttpWebhookSender {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<(), WebhookError> {
        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_renders_machine_readable_code() {
        assert_eq!(WebhookError::Status(500).to_string(), "webhook_status_500");
        assert_eq!(WebhookError::Status(404).to_string(), "webhook_status_404");
    }

    #[test]
    fn new_builds_a_client() {
        assert!(HttpWebhookSender::new().is_ok());
    }
}
