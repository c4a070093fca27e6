//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the form relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Destination webhook.
    pub webhook: WebhookConfig,

    /// Request translation rules.
    pub relay: RelayRulesConfig,

    /// Size and count ceilings for inbound submissions.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Destination webhook configuration.
///
/// The URL is optional at load time. A relay without one still starts, and
/// answers every POST with a misconfiguration error.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook URL submissions are forwarded to.
    pub url: Option<String>,
}

/// How inbound submissions are translated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayRulesConfig {
    /// Route the relay handler is mounted on.
    pub path: String,

    /// Name of the required structured-message text field.
    pub message_field: String,

    /// Reject submissions whose message field is not valid JSON.
    pub require_json_message: bool,

    /// Forward text fields other than the message field under their own names.
    pub forward_extra_fields: bool,
}

impl Default for RelayRulesConfig {
    fn default() -> Self {
        Self {
            path: "/api/discord-proxy".to_string(),
            message_field: "payload_json".to_string(),
            require_json_message: true,
            forward_extra_fields: false,
        }
    }
}

/// Inbound submission limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of file attachments per submission.
    pub max_files: usize,

    /// Maximum size of a single attachment in bytes.
    pub max_file_bytes: u64,

    /// Maximum size of the whole request body in bytes.
    pub max_body_bytes: usize,

    /// Directory attachments are spooled to. System temp dir when unset.
    pub spool_dir: Option<PathBuf>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_bytes: 8 * 1024 * 1024,  // 8MB
            max_body_bytes: 25 * 1024 * 1024, // 25MB
            spool_dir: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Timeout for the upstream webhook call in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert!(config.webhook.url.is_none());
        assert_eq!(config.relay.message_field, "payload_json");
        assert_eq!(config.limits.max_files, 10);
        assert!(config.relay.require_json_message);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [webhook]
            url = "https://discord.com/api/webhooks/1/abc"

            [limits]
            max_files = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            config.webhook.url.as_deref(),
            Some("https://discord.com/api/webhooks/1/abc")
        );
        assert_eq!(config.limits.max_files, 3);
        assert_eq!(config.limits.max_file_bytes, 8 * 1024 * 1024);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
