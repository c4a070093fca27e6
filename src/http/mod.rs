//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign / propagate x-request-id)
//!     → relay::handle
//!     → JSON reply to client
//! ```

pub mod request;
pub mod server;

pub use server::HttpServer;
