//! Multipart form relay library.
//!
//! Accepts browser form submissions and forwards them, re-packaged, to a
//! fixed webhook endpoint.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
