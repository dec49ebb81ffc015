//! Caller-visible submission errors.
//!
//! Every way [`SubmissionService::submit`](crate::SubmissionService::submit)
//! can fail maps to exactly one [`SubmitError`] variant, and every variant
//! carries a stable problem type and HTTP status. A node `ERROR` reply is not
//! in here: that is a successful submission whose answer happens to be "no".

use thiserror::Error;

use crate::client::RequestError;
use crate::envelope::EnvelopeError;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// The client's envelope could not be decoded or hashed.
    #[error("transaction malformed: {0}")]
    MalformedEnvelope(#[source] EnvelopeError),

    /// The operator has switched submission off.
    #[error("transaction submission is disabled")]
    SubmissionDisabled,

    /// The core node is not synced, so its answer could not be trusted.
    #[error("core node is not synced")]
    ReadinessUnavailable,

    /// The node could not be reached or did not answer usefully.
    #[error("could not submit transaction: {0}")]
    Request(#[from] RequestError),

    /// The node answered with a free-text exception.
    #[error("core reported an exception: {0}")]
    SubmissionException(String),

    /// The node answered with a status this relay does not recognise.
    #[error("core returned unrecognised status {0:?}")]
    InvalidSubmissionStatus(String),
}

impl SubmitError {
    /// Problem-details `type` key.
    pub fn problem_type(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "transaction_malformed",
            Self::SubmissionDisabled => "transaction_submission_disabled",
            Self::ReadinessUnavailable => "stale_history",
            Self::Request(_) => "transaction_submission_failed",
            Self::SubmissionException(_) => "transaction_submission_exception",
            Self::InvalidSubmissionStatus(_) => "transaction_submission_invalid_status",
        }
    }

    /// Short human-readable title for the problem body.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope(_) => "Transaction Malformed",
            Self::SubmissionDisabled => "Transaction Submission Disabled",
            Self::ReadinessUnavailable => "Historical DB Is Too Stale",
            Self::Request(_) => "Transaction Submission Failed",
            Self::SubmissionException(_) => "Transaction Submission Exception",
            Self::InvalidSubmissionStatus(_) => "Transaction Submission Invalid Status",
        }
    }

    /// HTTP status code. Anything attributable to the node is a 502.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedEnvelope(_) => 400,
            Self::SubmissionDisabled => 405,
            Self::ReadinessUnavailable => 503,
            Self::Request(_) | Self::SubmissionException(_) | Self::InvalidSubmissionStatus(_) => {
                502
            }
        }
    }

    /// Whether resubmitting the same envelope later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ReadinessUnavailable | Self::Request(_))
    }
}

impl From<EnvelopeError> for SubmitError {
    fn from(err: EnvelopeError) -> Self {
        Self::MalformedEnvelope(err)
    }
}
