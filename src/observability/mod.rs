//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay handler / HTTP layers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics exporter is off by default

pub mod logging;
pub mod metrics;
