//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use form_relay::{HttpServer, RelayConfig, Shutdown};
use tokio::net::TcpListener;

/// One multipart part as seen by the mock webhook.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Every request body the mock webhook has received, in order.
pub type Received = Arc<Mutex<Vec<Vec<ReceivedPart>>>>;

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    delay: Duration,
    received: Received,
}

async fn record(State(state): State<MockState>, mut multipart: Multipart) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.received.lock().unwrap().push(parts);
    tokio::time::sleep(state.delay).await;
    (state.status, state.body.to_string())
}

/// Start a mock webhook answering every POST with `status` and `body`.
/// Returns its URL and the log of received payloads.
pub async fn start_mock_webhook(status: u16, body: &'static str) -> (String, Received) {
    start_delayed_webhook(status, body, Duration::ZERO).await
}

/// Like `start_mock_webhook`, but holds each response back for `delay`
/// after the payload has been read.
pub async fn start_delayed_webhook(
    status: u16,
    body: &'static str,
    delay: Duration,
) -> (String, Received) {
    let received: Received = Arc::default();
    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        delay,
        received: received.clone(),
    };

    let app = Router::new().route("/webhook", post(record)).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/webhook", addr), received)
}

/// A URL nothing is listening on.
pub async fn unreachable_webhook() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook", addr)
}

/// Relay config pointing at `webhook`, spooling into `spool_dir`.
pub fn relay_config(webhook: Option<String>, spool_dir: Option<PathBuf>) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.webhook.url = webhook;
    config.limits.spool_dir = spool_dir;
    config.timeouts.upstream_secs = 5;
    config
}

/// A running relay. Dropping it does not stop the server; call `stop`.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub url: String,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start a relay on an ephemeral port.
pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let path = config.relay.path.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay {
        addr,
        url: format!("http://{}{}", addr, path),
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A file part as a browser would send it.
pub fn file_part(file_name: &str, content_type: &str, data: &[u8]) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str(content_type)
        .unwrap()
}
