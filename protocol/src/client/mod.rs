//! # Core Node Client
//!
//! The relay forwards each envelope to a core node and reports the node's
//! immediate admission decision. This module owns that conversation.
//!
//! ```text
//! ack.rs     — wire shapes and the SubmissionAcknowledgment enum
//! context.rs — per-request cancellation and deadlines
//! error.rs   — RequestError
//! http.rs    — HttpCoreClient (reqwest)
//! mock.rs    — scripted client (tests only)
//! ```
//!
//! A submission is one round trip. Nothing here retries.

pub mod ack;
pub mod context;
mod error;
pub mod http;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use async_trait::async_trait;

pub use ack::{CoreInfo, StatusReply, SubmissionAcknowledgment, TxStatus};
pub use context::RequestContext;
pub use error::RequestError;
pub use http::HttpCoreClient;

/// Anything that can forward an envelope to a core node.
///
/// Implementations must be safe to call from many requests at once.
#[async_trait]
pub trait CoreClient: Send + Sync {
    /// Forward `raw` (the client's base64 envelope, unmodified) and return the
    /// node's acknowledgment.
    ///
    /// Transport failures, non-2xx replies, undecodable bodies, deadline
    /// expiry and cancellation all surface as [`RequestError`].
    async fn submit_transaction(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<SubmissionAcknowledgment, RequestError>;

    /// Fetch the node's self-description.
    async fn info(&self, ctx: &RequestContext) -> Result<CoreInfo, RequestError>;
}
