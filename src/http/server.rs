//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay and health handlers
//! - Wire up middleware (request ID, tracing, multipart body limit)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::ShutdownListener;
use crate::relay::{handle, RelayState};

/// HTTP server for the form relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let config = Arc::new(config);
        let state = RelayState::new(config.clone())?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The relay route accepts every method so the handler can answer
    /// non-POST requests itself, with the same JSON shape as other errors.
    /// No layer here may answer on the handler's behalf: the body ceiling is
    /// enforced by the multipart extractor, after the method and webhook
    /// checks, and the only timeout is the upstream client's.
    fn build_router(config: &RelayConfig, state: RelayState) -> Router {
        Router::new()
            .route(&config.relay.path, any(handle))
            .route("/health", get(health))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            "HTTP server starting"
        );

        if self.config.webhook.url.is_none() {
            tracing::warn!("No webhook URL configured; every submission will fail with 500");
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> &'static str {
    "ok"
}
