//! Webhook transmission.

use std::time::Duration;

use axum::http::StatusCode;

use crate::relay::error::RelayError;
use crate::relay::payload::OutboundPayload;

/// Outcome of one webhook call that reached the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResult {
    pub success: bool,
    pub status: StatusCode,
    /// Upstream response body when the call was rejected.
    pub error: Option<String>,
}

impl RelayResult {
    /// Convert a rejected result into the error surfaced to the client.
    pub fn into_result(self) -> Result<(), RelayError> {
        if self.success {
            Ok(())
        } else {
            Err(RelayError::UpstreamRejected {
                status: self.status,
                body: self.error.unwrap_or_default(),
            })
        }
    }
}

/// HTTP client for the destination webhook. Cheap to clone; connections are
/// pooled across requests.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("form-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Send `payload` to `url`. Transport failures, timeouts included, become
    /// `RelayError::Network`; any HTTP answer becomes a `RelayResult`.
    pub async fn send(&self, url: &str, payload: &OutboundPayload) -> Result<RelayResult, RelayError> {
        let form = payload.to_form().await?;

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(RelayError::Network)?;

        let status = response.status();
        if status.is_success() {
            return Ok(RelayResult {
                success: true,
                status,
                error: None,
            });
        }

        let body = response.text().await.map_err(RelayError::Network)?;
        Ok(RelayResult {
            success: false,
            status,
            error: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_result_keeps_status_and_body() {
        let result = RelayResult {
            success: false,
            status: StatusCode::TOO_MANY_REQUESTS,
            error: Some("{\"retry_after\": 1.5}".into()),
        };

        match result.into_result() {
            Err(RelayError::UpstreamRejected { status, body }) => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "{\"retry_after\": 1.5}");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_result() {
        let result = RelayResult {
            success: true,
            status: StatusCode::NO_CONTENT,
            error: None,
        };
        assert!(result.into_result().is_ok());
    }
}
