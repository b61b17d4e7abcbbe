//! Webhook delivery over HTTP POST.

use std::sync::Arc;
use std::time::Duration;

use dispatch::ResultDelivery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Settings for outbound callback requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Timeout for a single request, in seconds.
    pub timeout_secs: u64,
    /// Maximum requests in flight. `0` means unlimited.
    pub limit: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            limit: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Callback returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Posts job results to their callback URLs.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
    limit: Option<Arc<Semaphore>>,
}

impl WebhookDelivery {
    /// Create a delivery service with a pre-configured HTTP client.
    pub fn new(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let limit = (config.limit > 0).then(|| Arc::new(Semaphore::new(config.limit)));
        Ok(Self { client, limit })
    }

    /// Execute a single POST request and check the response status.
    pub async fn post(&self, url: &str, payload: &Value) -> Result<(), DeliveryError> {
        let _permit = match &self.limit {
            // The semaphore is never closed.
            Some(limit) => limit.acquire().await.ok(),
            None => None,
        };

        let response = self.client.post(url).json(payload).send().await?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

impl ResultDelivery for WebhookDelivery {
    fn send(&self, url: String, payload: Value) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(url, "No async runtime, callback dropped");
            return;
        };

        let delivery = self.clone();
        runtime.spawn(async move {
            match delivery.post(&url, &payload).await {
                Ok(()) => tracing::debug!(url, "Callback delivered"),
                Err(e) => tracing::warn!(url, error = %e, "Callback delivery failed"),
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_with_defaults() {
        let delivery = WebhookDelivery::new(&DeliveryConfig::default()).unwrap();
        assert!(delivery.limit.is_none());
    }

    #[test]
    fn limit_creates_semaphore() {
        let config = DeliveryConfig {
            limit: 3,
            ..Default::default()
        };
        let delivery = WebhookDelivery::new(&config).unwrap();
        let limit = delivery.limit.expect("limit should be set");
        assert_eq!(limit.available_permits(), 3);
    }

    #[test]
    fn delivery_error_display_http_status() {
        let err = DeliveryError::HttpStatus(502);
        assert_eq!(err.to_string(), "Callback returned HTTP 502");
    }

    #[test]
    fn send_without_runtime_is_dropped() {
        let delivery = WebhookDelivery::new(&DeliveryConfig::default()).unwrap();
        delivery.send("http://127.0.0.1:1/done".into(), Value::Null);
    }

    #[tokio::test]
    async fn post_to_unreachable_address_fails() {
        let config = DeliveryConfig {
            timeout_secs: 2,
            ..Default::default()
        };
        let delivery = WebhookDelivery::new(&config).unwrap();
        let err = delivery
            .post("http://127.0.0.1:1/done", &Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Request(_)));
    }
}
