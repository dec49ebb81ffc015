//! # Prometheus Metrics
//!
//! Owns the relay's metrics registry and serves it at `/metrics` on the
//! metrics port. Submission collectors come from the protocol crate; the
//! node adds its own view of core sync health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::Arc;

use txsub_protocol::SubmissionMetrics;

/// Namespace prefixed to every metric name.
pub const METRICS_NAMESPACE: &str = "txsub";

/// Holds all Prometheus metric handles for the relay.
#[derive(Clone)]
pub struct NodeMetrics {
    registry: Registry,
    /// Duration histogram and outcome counter for core submissions.
    pub submissions: SubmissionMetrics,
    /// 1 while the core node reports itself synced, 0 otherwise.
    pub core_synced: IntGauge,
    /// Failed `/info` polls against the core node.
    pub core_info_failures_total: IntCounter,
}

impl NodeMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some(METRICS_NAMESPACE.into()), None)?;

        let submissions = SubmissionMetrics::register(&registry)?;

        let core_synced = IntGauge::new(
            "core_synced",
            "Whether the core node last reported itself synced",
        )?;
        registry.register(Box::new(core_synced.clone()))?;

        let core_info_failures_total = IntCounter::new(
            "core_info_failures_total",
            "Core /info polls that failed or returned an unusable reply",
        )?;
        registry.register(Box::new(core_info_failures_total.clone()))?;

        Ok(Self {
            registry,
            submissions,
            core_synced,
            core_info_failures_total,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics state passed to axum handlers and background tasks.
pub type SharedMetrics = Arc<NodeMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(State(metrics): State<SharedMetrics>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}

/// Router for the metrics port.
pub fn metrics_router(metrics: SharedMetrics) -> axum::Router {
    axum::Router::new()
        .route("/metrics", axum::routing::get(metrics_handler))
        .with_state(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use txsub_protocol::EnvelopeVariant;

    #[test]
    fn names_are_namespaced() {
        let metrics = NodeMetrics::new().unwrap();
        metrics
            .submissions
            .observe("PENDING", EnvelopeVariant::Versioned, std::time::Duration::from_millis(3));
        metrics.core_synced.set(1);

        let text = metrics.encode().unwrap();
        assert!(text.contains("txsub_submissions_total{envelope_type=\"v1\",status=\"PENDING\"} 1"));
        assert!(text.contains("txsub_submission_duration_seconds_bucket"));
        assert!(text.contains("txsub_core_synced 1"));
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text_format() {
        let metrics = Arc::new(NodeMetrics::new().unwrap());
        metrics.core_info_failures_total.inc();

        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let resp = metrics_router(metrics).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("txsub_core_info_failures_total 1"));
    }
}
