//! Relay error taxonomy and its HTTP mapping.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that terminate a relay request. None are retried.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Anything other than POST.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// No destination webhook is configured.
    #[error("Server Error: Webhook URL is missing from configuration.")]
    Misconfiguration,

    /// The client sent something the relay cannot accept.
    #[error("{0}")]
    BadRequest(String),

    /// The body was accepted but could not be spooled.
    #[error("Failed to parse form data.")]
    Parse(#[source] std::io::Error),

    /// The webhook answered with a non-success status.
    #[error("Failed to proxy request to webhook.")]
    UpstreamRejected { status: StatusCode, body: String },

    /// The webhook could not be reached.
    #[error("Network error during proxy attempt.")]
    Network(#[source] reqwest::Error),
}

/// JSON body returned to the client for every outcome.
#[derive(Debug, Serialize)]
pub struct RelayReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: None,
        }
    }
}

impl RelayError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamRejected { status, .. } => *status,
            RelayError::Misconfiguration | RelayError::Parse(_) | RelayError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::Misconfiguration => "misconfiguration",
            RelayError::BadRequest(_) => "bad_request",
            RelayError::Parse(_) => "parse_error",
            RelayError::UpstreamRejected { .. } => "upstream_rejected",
            RelayError::Network(_) => "network_error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            RelayError::UpstreamRejected { body, .. } => Some(body.clone()),
            _ => None,
        };
        let reply = RelayReply {
            success: false,
            message: self.to_string(),
            details,
        };
        let mut response = (status, Json(reply)).into_response();
        if matches!(self, RelayError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(RelayError::Misconfiguration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(RelayError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);

        let rejected = RelayError::UpstreamRejected {
            status: StatusCode::NOT_FOUND,
            body: "{\"message\": \"Unknown Webhook\"}".into(),
        };
        assert_eq!(rejected.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reply_omits_empty_details() {
        let json = serde_json::to_value(RelayReply::ok("done")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "done"}));
    }
}
