//! The relay request pipeline.
//!
//! ```text
//! method check → webhook configured? → parse multipart (spool files)
//!     → build payload (file0..fileN) → send → reply
//! ```
//!
//! Every step returns early with a [`RelayError`]. Spooled files belong to the
//! submission, then to the payload, so they are deleted on every exit path.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::relay::error::{RelayError, RelayReply};
use crate::relay::payload::OutboundPayload;
use crate::relay::submission::IncomingSubmission;
use crate::relay::upstream::WebhookClient;

/// Shared, read-only state of the relay handler.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<RelayConfig>,
    pub webhook: WebhookClient,
}

impl RelayState {
    pub fn new(config: Arc<RelayConfig>) -> Result<Self, reqwest::Error> {
        let webhook = WebhookClient::new(std::time::Duration::from_secs(
            config.timeouts.upstream_secs,
        ))?;
        Ok(Self { config, webhook })
    }
}

/// Relay one client submission to the webhook.
pub async fn handle(State(state): State<RelayState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    match relay(&state, request).await {
        Ok(files) => {
            tracing::info!(request_id = %request_id, files, "Submission relayed");
            metrics::record_relay("success", StatusCode::OK, start_time);
            metrics::record_attachments(files);
            (
                StatusCode::OK,
                Json(RelayReply::ok("Report sent successfully.")),
            )
                .into_response()
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, status = %status, error = ?e, "Relay failed");
            } else {
                tracing::warn!(request_id = %request_id, status = %status, error = %e, "Relay rejected");
            }
            metrics::record_relay(e.kind(), status, start_time);
            e.into_response()
        }
    }
}

/// Run the pipeline. Returns the number of attachments forwarded.
async fn relay(state: &RelayState, request: Request<Body>) -> Result<usize, RelayError> {
    if request.method() != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let url = state
        .config
        .webhook
        .url
        .as_deref()
        .ok_or(RelayError::Misconfiguration)?;

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| RelayError::BadRequest(rejection.body_text()))?;

    let submission = IncomingSubmission::parse(&mut multipart, &state.config.limits).await?;
    tracing::debug!(
        fields = submission.fields().len(),
        attachments = submission.attachments().len(),
        "Submission parsed"
    );

    let payload = OutboundPayload::from_submission(submission, &state.config.relay)?;
    let files = payload.files.len();

    state.webhook.send(url, &payload).await?.into_result()?;
    Ok(files)
}
