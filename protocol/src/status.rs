//! Acknowledgment → HTTP status table.

use serde::{Deserialize, Serialize};

use crate::client::{StatusReply, SubmissionAcknowledgment, TxStatus};
use crate::config::{
    HTTP_STATUS_DUPLICATE, HTTP_STATUS_ERROR, HTTP_STATUS_PENDING, HTTP_STATUS_TRY_AGAIN_LATER,
};
use crate::envelope::EnvelopeInfo;
use crate::error::SubmitError;

/// What the caller gets back when the node gave a recognised answer.
///
/// `status` is also the HTTP status of the response that carries this body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// The node's status string, e.g. `"PENDING"`.
    pub tx_status: String,
    pub status: u16,
    /// Outer transaction hash, lowercase hex.
    pub hash: String,
    #[serde(
        rename = "errorResultXdr",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_result_xdr: Option<String>,
    #[serde(
        rename = "diagnosticEventsXdr",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub diagnostic_events_xdr: Option<String>,
}

impl SubmissionResponse {
    fn plain(status: &TxStatus, code: u16, info: &EnvelopeInfo) -> Self {
        Self {
            tx_status: status.as_str().to_string(),
            status: code,
            hash: info.hash_hex(),
            error_result_xdr: None,
            diagnostic_events_xdr: None,
        }
    }
}

/// Translate the node's acknowledgment into the relay's response.
///
/// | acknowledgment     | result                                   |
/// |--------------------|------------------------------------------|
/// | exception          | `SubmitError::SubmissionException`       |
/// | `ERROR`            | 400, error and diagnostic payloads echoed |
/// | `PENDING`          | 201                                      |
/// | `DUPLICATE`        | 409                                      |
/// | `TRY_AGAIN_LATER`  | 503                                      |
/// | anything else      | `SubmitError::InvalidSubmissionStatus`   |
///
/// The hash is always the outer hash, fee bump or not.
pub fn map_acknowledgment(
    ack: SubmissionAcknowledgment,
    info: &EnvelopeInfo,
) -> Result<SubmissionResponse, SubmitError> {
    let reply = match ack {
        SubmissionAcknowledgment::Exception(text) => {
            return Err(SubmitError::SubmissionException(text))
        }
        SubmissionAcknowledgment::Status(reply) => reply,
    };

    let StatusReply {
        status,
        error_result_xdr,
        diagnostic_events_xdr,
    } = reply;

    let code = match &status {
        TxStatus::Error => HTTP_STATUS_ERROR,
        TxStatus::Pending => HTTP_STATUS_PENDING,
        TxStatus::Duplicate => HTTP_STATUS_DUPLICATE,
        TxStatus::TryAgainLater => HTTP_STATUS_TRY_AGAIN_LATER,
        TxStatus::Unknown(raw) => return Err(SubmitError::InvalidSubmissionStatus(raw.clone())),
    };

    let mut response = SubmissionResponse::plain(&status, code, info);
    if status == TxStatus::Error {
        response.error_result_xdr = error_result_xdr;
        response.diagnostic_events_xdr = diagnostic_events_xdr;
    }
    Ok(response)
}
