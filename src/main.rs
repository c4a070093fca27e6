//! Form relay (v1)
//!
//! Forwards browser `multipart/form-data` submissions to a webhook.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client POST            ┌──────────────────────────────────────────────┐
//!     ───────────────────────┼─▶ http::server ──▶ relay::handler            │
//!                            │                      │                       │
//!                            │                      ▼                       │
//!                            │      relay::submission (spool to temp files) │
//!                            │                      │                       │
//!                            │                      ▼                       │
//!                            │      relay::payload (payload_json, file0..N) │
//!                            │                      │                       │
//!     JSON reply             │                      ▼                       │
//!     ◀──────────────────────┼──── relay::upstream ─┼───────────────────────┼──▶ Webhook
//!                            │                                              │
//!                            │  config · observability · lifecycle          │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use form_relay::config::load_config;
use form_relay::lifecycle::{wait_for_signal, Shutdown};
use form_relay::observability::{logging, metrics};
use form_relay::HttpServer;

#[derive(Parser)]
#[command(name = "form-relay")]
#[command(about = "Relay browser form submissions to a webhook", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("form-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        webhook_configured = config.webhook.url.is_some(),
        max_files = config.limits.max_files,
        max_file_bytes = config.limits.max_file_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
