//! Post delivery
//!
//! The orchestrator hands each finished post to a [`Publisher`] keyed by the
//! generated title. Delivery is fire-and-forget per topic: a failed publish
//! costs that topic for the run, and the core never retries the transport
//! itself.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use crate::config::PublisherConfig;
use crate::error::{Error, Result};

/// Delivery sink consumed by the orchestrator
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver a payload under the given label (post title / mail subject)
    async fn publish(&self, label: &str, payload: &str) -> Result<()>;
}

// ============================================================================
// Webhook Publisher
// ============================================================================

/// JSON body POSTed to the webhook endpoint
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    label: &'a str,
    payload: &'a str,
    published_at: String,
}

/// Publisher delivering posts as JSON via HTTP POST
pub struct WebhookPublisher {
    client: Client,
    config: PublisherConfig,
}

impl WebhookPublisher {
    /// Create a webhook publisher with the given configuration
    pub fn new(config: PublisherConfig) -> Result<Self> {
        Self::validate(&config)?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, config })
    }

    fn validate(config: &PublisherConfig) -> Result<()> {
        if config.webhook_url.is_empty() {
            return Err(Error::config("webhook URL cannot be empty"));
        }

        if !config.webhook_url.starts_with("http://") && !config.webhook_url.starts_with("https://")
        {
            return Err(Error::config(
                "webhook URL must start with http:// or https://",
            ));
        }

        if config.timeout_secs == 0 {
            return Err(Error::config("publisher timeout must be greater than 0"));
        }

        Ok(())
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(&self, label: &str, payload: &str) -> Result<()> {
        let body = WebhookPayload {
            label,
            payload,
            published_at: Utc::now().to_rfc3339(),
        };

        let mut request = self.client.post(&self.config.webhook_url).json(&body);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::publish(label, format!("delivery failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::publish(label, format!("endpoint returned {status}")));
        }

        tracing::info!(label = label, status = %status, "Post delivered");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
