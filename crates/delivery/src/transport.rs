//! Webhook transport port and its `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::DeliveryError;

/// Posts one JSON document to one URL.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POSTs `body` to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] on timeout, transport failure, or a
    /// non-success status.
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError>;
}

/// [`WebhookTransport`] over HTTP, bounded by a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport with its own connection pool.
    pub fn new(timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), timeout)
    }

    /// Creates a transport over an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "webhook returned error");
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, "webhook accepted payload");
        Ok(())
    }
}
