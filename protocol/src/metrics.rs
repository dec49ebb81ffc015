//! # Submission Metrics
//!
//! Every outbound submission is timed and counted, labelled by outcome and
//! envelope type. The collectors are registered into a registry owned by the
//! caller, so the relay never touches the process-global default registry.
//!
//! Outcome labels:
//!
//! | label              | meaning                                  |
//! |--------------------|------------------------------------------|
//! | `request_error`    | transport failure, timeout, cancellation |
//! | `exception`        | node replied with an exception           |
//! | `PENDING` etc.     | node replied with a known status         |
//! | `unknown`          | node replied with an unrecognised status |

use std::sync::Arc;
use std::time::{Duration, Instant};

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::client::{CoreClient, RequestContext, RequestError, SubmissionAcknowledgment};
use crate::envelope::EnvelopeVariant;

/// Outcome label for calls that produced no acknowledgment.
pub const STATUS_REQUEST_ERROR: &str = "request_error";

const LABELS: &[&str] = &["status", "envelope_type"];

/// Latency buckets in seconds. Submissions are a single local round trip, so
/// resolution is concentrated below one second.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Handles to the submission collectors.
///
/// Clone-friendly; clones share the underlying atomics.
#[derive(Clone)]
pub struct SubmissionMetrics {
    duration: HistogramVec,
    submissions: IntCounterVec,
}

impl SubmissionMetrics {
    /// Create the collectors and register them into `registry`.
    ///
    /// Fails if collectors with the same names are already registered there.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "submission_duration_seconds",
                "Time spent waiting for the core node to acknowledge a submission",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            LABELS,
        )?;
        registry.register(Box::new(duration.clone()))?;

        let submissions = IntCounterVec::new(
            Opts::new(
                "submissions_total",
                "Submissions forwarded to the core node, by outcome",
            ),
            LABELS,
        )?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            duration,
            submissions,
        })
    }

    /// Record one completed call.
    pub fn observe(&self, status: &str, variant: EnvelopeVariant, elapsed: Duration) {
        let labels = [status, variant.label()];
        self.duration
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
        self.submissions.with_label_values(&labels).inc();
    }

    /// Counter value for one label pair.
    pub fn count(&self, status: &str, variant: EnvelopeVariant) -> u64 {
        self.submissions
            .with_label_values(&[status, variant.label()])
            .get()
    }

    /// Histogram sample count for one label pair.
    pub fn duration_samples(&self, status: &str, variant: EnvelopeVariant) -> u64 {
        self.duration
            .with_label_values(&[status, variant.label()])
            .get_sample_count()
    }
}

/// Records a call's outcome exactly once: explicitly via [`finish`], or as a
/// request error if the call future is dropped first.
///
/// [`finish`]: Observation::finish
struct Observation<'a> {
    metrics: &'a SubmissionMetrics,
    variant: EnvelopeVariant,
    started: Instant,
    recorded: bool,
}

impl<'a> Observation<'a> {
    fn start(metrics: &'a SubmissionMetrics, variant: EnvelopeVariant) -> Self {
        Self {
            metrics,
            variant,
            started: Instant::now(),
            recorded: false,
        }
    }

    fn finish(mut self, status: &str) {
        self.record(status);
    }

    fn record(&mut self, status: &str) {
        if !self.recorded {
            self.recorded = true;
            self.metrics
                .observe(status, self.variant, self.started.elapsed());
        }
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        self.record(STATUS_REQUEST_ERROR);
    }
}

/// Wraps a [`CoreClient`] so every submission is timed and counted.
#[derive(Clone)]
pub struct InstrumentedCoreClient {
    inner: Arc<dyn CoreClient>,
    metrics: SubmissionMetrics,
}

impl InstrumentedCoreClient {
    pub fn new(inner: Arc<dyn CoreClient>, metrics: SubmissionMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn metrics(&self) -> &SubmissionMetrics {
        &self.metrics
    }

    /// Forward to the wrapped client and record the outcome once it returns.
    /// The wrapped result is passed through untouched.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        raw: &str,
        variant: EnvelopeVariant,
    ) -> Result<SubmissionAcknowledgment, RequestError> {
        let observation = Observation::start(&self.metrics, variant);
        let result = self.inner.submit_transaction(ctx, raw).await;
        observation.finish(match &result {
            Ok(ack) => ack.metric_label(),
            Err(_) => STATUS_REQUEST_ERROR,
        });
        result
    }
}
