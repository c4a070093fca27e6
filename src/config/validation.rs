//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Returns every problem found,
//! not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("webhook.url '{0}' is not a valid URL")]
    InvalidWebhookUrl(String),

    #[error("webhook.url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("relay.path must start with '/', got '{0}'")]
    InvalidPath(String),

    #[error("relay.message_field must not be empty")]
    EmptyMessageField,

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("limits.max_file_bytes ({file}) exceeds limits.max_body_bytes ({body})")]
    FileLargerThanBody { file: u64, body: usize },
}

/// Validate a configuration. A missing webhook URL is not an error here; the
/// relay reports it per request.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(raw) = &config.webhook.url {
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string())),
            Err(_) => errors.push(ValidationError::InvalidWebhookUrl(raw.clone())),
        }
    }

    if !config.relay.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.relay.path.clone()));
    }
    if config.relay.message_field.trim().is_empty() {
        errors.push(ValidationError::EmptyMessageField);
    }

    let limits = &config.limits;
    if limits.max_files == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_files"));
    }
    if limits.max_file_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_file_bytes"));
    }
    if limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLimit("limits.max_body_bytes"));
    } else if limits.max_file_bytes > limits.max_body_bytes as u64 {
        errors.push(ValidationError::FileLargerThanBody {
            file: limits.max_file_bytes,
            body: limits.max_body_bytes,
        });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroLimit("timeouts.upstream_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
