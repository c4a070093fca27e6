//! Form relay subsystem.
//!
//! # Data Flow
//! ```text
//! client multipart POST
//!     → submission.rs (IncomingSubmission: text fields + spooled attachments)
//!     → payload.rs (OutboundPayload: message field + file0..fileN)
//!     → upstream.rs (WebhookClient → RelayResult)
//!     → handler.rs (map to JSON reply / RelayError)
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing survives the request except metrics
//! - Temp files are owned values; dropping them deletes them
//! - No retries; every error is terminal for the request

pub mod error;
pub mod handler;
pub mod payload;
pub mod submission;
pub mod upstream;

pub use error::{RelayError, RelayReply};
pub use handler::{handle, RelayState};
pub use payload::OutboundPayload;
pub use submission::{Attachment, IncomingSubmission};
pub use upstream::{RelayResult, WebhookClient};
