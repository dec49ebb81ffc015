//! # Submission Orchestrator
//!
//! Strings the pieces together for one request:
//!
//! ```text
//! Received ──disabled?──▶ SubmissionDisabled
//!    │
//!    ▼ decode
//! Decoded ──not synced?──▶ ReadinessUnavailable      (node never contacted)
//!    │
//!    ▼ instrumented submit
//! Submitted ──▶ map_acknowledgment ──▶ SubmissionResponse | SubmitError
//! ```
//!
//! Each step runs once. There are no retries and no de-duplication: two
//! identical submissions make two round trips.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, field, info, info_span, warn, Instrument, Span};

use crate::client::{RequestContext, SubmissionAcknowledgment, TxStatus};
use crate::config::RelayConfig;
use crate::envelope::decode_envelope;
use crate::error::SubmitError;
use crate::metrics::InstrumentedCoreClient;
use crate::readiness::ReadinessProvider;
use crate::status::{map_acknowledgment, SubmissionResponse};

/// Accepts raw envelopes and reports the node's admission decision.
///
/// Cheap to clone; share one instance across all request handlers.
#[derive(Clone)]
pub struct SubmissionService {
    client: InstrumentedCoreClient,
    readiness: Arc<dyn ReadinessProvider>,
    network_passphrase: Arc<str>,
    disabled: bool,
    submit_timeout: Duration,
}

impl SubmissionService {
    pub fn new(
        config: &RelayConfig,
        client: InstrumentedCoreClient,
        readiness: Arc<dyn ReadinessProvider>,
    ) -> Self {
        Self {
            client,
            readiness,
            network_passphrase: Arc::from(config.network_passphrase.as_str()),
            disabled: config.disable_tx_sub,
            submit_timeout: config.submit_timeout,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.readiness().synced
    }

    /// Submit one envelope.
    ///
    /// `raw` is forwarded to the node byte for byte. The caller's context is
    /// narrowed to the configured submit timeout; an earlier caller deadline
    /// still wins.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<SubmissionResponse, SubmitError> {
        let ctx = ctx.clone().with_timeout(self.submit_timeout);
        let span = info_span!(
            "submit_transaction",
            request_id = %ctx.request_id(),
            hash = field::Empty,
            envelope_type = field::Empty,
        );
        self.submit_inner(&ctx, raw).instrument(span).await
    }

    async fn submit_inner(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<SubmissionResponse, SubmitError> {
        if self.disabled {
            info!("rejecting submission: submission is disabled");
            return Err(SubmitError::SubmissionDisabled);
        }

        let envelope = decode_envelope(raw, &self.network_passphrase).map_err(|e| {
            info!(error = %e, "rejecting malformed envelope");
            SubmitError::MalformedEnvelope(e)
        })?;
        let variant = envelope.variant();
        let span = Span::current();
        span.record("hash", field::display(envelope.hash_hex()));
        span.record("envelope_type", variant.label());

        if !self.readiness.readiness().synced {
            warn!("rejecting submission: core is not synced");
            return Err(SubmitError::ReadinessUnavailable);
        }

        let ack = self
            .client
            .submit(ctx, &envelope.raw, variant)
            .await
            .map_err(|e| {
                warn!(error = %e, "core submission failed");
                SubmitError::Request(e)
            })?;

        match &ack {
            SubmissionAcknowledgment::Exception(text) => {
                error!(
                    exception = %text,
                    inner_hash = ?envelope.inner_hash_hex(),
                    "core reported an exception for submission"
                );
            }
            SubmissionAcknowledgment::Status(reply) => match &reply.status {
                TxStatus::Unknown(raw_status) => {
                    error!(
                        status = %raw_status,
                        inner_hash = ?envelope.inner_hash_hex(),
                        "core returned an unrecognised submission status"
                    );
                }
                status => info!(status = %status, "core acknowledged submission"),
            },
        }

        map_acknowledgment(ack, &envelope)
    }
}
