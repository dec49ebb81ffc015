//! Wire types exchanged with the core node.
//!
//! The node answers a submission with a small JSON object whose fields are
//! all optional: a `status` string, an `error` payload when the status is
//! `ERROR`, optional `diagnostic_events`, or an `exception` when it could not
//! make sense of the request at all. [`SubmissionAcknowledgment`] folds that
//! loose shape into a tagged enum so the rest of the relay never has to ask
//! "which of these fields is authoritative?".

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TxStatus
// ---------------------------------------------------------------------------

/// Admission decision reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TxStatus {
    /// Accepted into the node's transaction queue.
    Pending,
    /// Already in the queue or recently applied.
    Duplicate,
    /// The node is overloaded; the client should resubmit later.
    TryAgainLater,
    /// Rejected. The reply carries a `TransactionResult` explaining why.
    Error,
    /// A status string this relay does not understand.
    Unknown(String),
}

impl TxStatus {
    pub const PENDING: &'static str = "PENDING";
    pub const DUPLICATE: &'static str = "DUPLICATE";
    pub const TRY_AGAIN_LATER: &'static str = "TRY_AGAIN_LATER";
    pub const ERROR: &'static str = "ERROR";

    /// Parse the node's status vocabulary. Never fails; unrecognised strings
    /// become [`TxStatus::Unknown`].
    pub fn from_wire(s: &str) -> Self {
        match s {
            Self::PENDING => Self::Pending,
            Self::DUPLICATE => Self::Duplicate,
            Self::TRY_AGAIN_LATER => Self::TryAgainLater,
            Self::ERROR => Self::Error,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire string. Unknown statuses echo what the node sent.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Duplicate => Self::DUPLICATE,
            Self::TryAgainLater => Self::TRY_AGAIN_LATER,
            Self::Error => Self::ERROR,
            Self::Unknown(raw) => raw,
        }
    }

    /// Metric label. Unknown statuses collapse to `"unknown"` so a
    /// misbehaving node cannot blow up label cardinality.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Duplicate => Self::DUPLICATE,
            Self::TryAgainLater => Self::TRY_AGAIN_LATER,
            Self::Error => Self::ERROR,
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SubmissionAcknowledgment
// ---------------------------------------------------------------------------

/// A status reply and its optional payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReply {
    pub status: TxStatus,
    /// Base64 `TransactionResult`. Only meaningful for [`TxStatus::Error`].
    pub error_result_xdr: Option<String>,
    /// Base64 diagnostic events. Only meaningful for [`TxStatus::Error`].
    pub diagnostic_events_xdr: Option<String>,
}

/// The node's immediate, non-final reply to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionAcknowledgment {
    /// The node could not process the request and said so in free text.
    Exception(String),
    /// A regular admission decision.
    Status(StatusReply),
}

impl SubmissionAcknowledgment {
    /// A payload-free status reply.
    pub fn status(status: TxStatus) -> Self {
        Self::Status(StatusReply {
            status,
            error_result_xdr: None,
            diagnostic_events_xdr: None,
        })
    }

    /// An `ERROR` reply with its payloads.
    pub fn error(
        error_result_xdr: impl Into<String>,
        diagnostic_events_xdr: Option<String>,
    ) -> Self {
        Self::Status(StatusReply {
            status: TxStatus::Error,
            error_result_xdr: non_empty(Some(error_result_xdr.into())),
            diagnostic_events_xdr: non_empty(diagnostic_events_xdr),
        })
    }

    /// Outcome label used on submission metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::Exception(_) => "exception",
            Self::Status(reply) => reply.status.metric_label(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Raw wire shapes
// ---------------------------------------------------------------------------

/// JSON body of the node's `/tx` endpoint, field for field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_events: Option<String>,
}

impl From<TxResponse> for SubmissionAcknowledgment {
    /// A non-empty `exception` wins; otherwise the status (possibly missing,
    /// which parses as an empty unknown status) is authoritative.
    fn from(wire: TxResponse) -> Self {
        if let Some(exception) = non_empty(wire.exception) {
            return Self::Exception(exception);
        }
        Self::Status(StatusReply {
            status: TxStatus::from_wire(wire.status.as_deref().unwrap_or_default()),
            error_result_xdr: non_empty(wire.error),
            diagnostic_events_xdr: non_empty(wire.diagnostic_events),
        })
    }
}

/// JSON body of the node's `/info` endpoint. Only the fields the relay uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub info: CoreInfo,
}

/// Node self-description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreInfo {
    /// Human-readable state, e.g. `"Synced!"` or `"Catching up"`.
    pub state: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub protocol_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<LedgerInfo>,
}

impl CoreInfo {
    pub fn is_synced(&self) -> bool {
        self.state == crate::config::CORE_SYNCED_STATE
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub num: u32,
}
