//! # Submission API
//!
//! Builds the axum router that exposes the relay's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                   | Description                          |
//! |--------|------------------------|--------------------------------------|
//! | GET    | `/health`              | Liveness probe                       |
//! | GET    | `/status`              | Relay and core sync summary          |
//! | POST   | `/transactions_async`  | Submit a transaction envelope (`tx`) |
//!
//! Failures are reported as `application/problem+json` documents.

use axum::{
    extract::{rejection::QueryRejection, FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use txsub_protocol::{RequestContext, SubmissionResponse, SubmissionService, SubmitError};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: the service is `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    /// The relay's reported version string.
    pub version: String,
    /// Friendly network name (e.g. "pubnet", "testnet").
    pub network: String,
    pub service: SubmissionService,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/transactions_async", post(submit_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Problem Documents
// ---------------------------------------------------------------------------

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// An error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<ProblemExtras>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemExtras {
    /// The envelope exactly as submitted.
    pub envelope_xdr: String,
    pub error: String,
}

impl Problem {
    /// Problem document for a failed submission of `envelope_xdr`.
    pub fn from_submit_error(err: &SubmitError, envelope_xdr: &str) -> Self {
        Self {
            problem_type: err.problem_type().to_string(),
            title: err.title().to_string(),
            status: err.status_code(),
            detail: submit_error_detail(err).to_string(),
            extras: Some(ProblemExtras {
                envelope_xdr: envelope_xdr.to_string(),
                error: err.to_string(),
            }),
        }
    }

    fn unsupported_media_type(content_type: &str) -> Self {
        Self {
            problem_type: "unsupported_media_type".into(),
            title: "Unsupported Media Type".into(),
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE.as_u16(),
            detail: format!(
                "Content type {content_type:?} is not supported. Submit the envelope as \
                 application/x-www-form-urlencoded or multipart/form-data."
            ),
            extras: None,
        }
    }

    fn bad_request(detail: String) -> Self {
        Self {
            problem_type: "bad_request".into(),
            title: "Bad Request".into(),
            status: StatusCode::BAD_REQUEST.as_u16(),
            detail,
            extras: None,
        }
    }
}

fn submit_error_detail(err: &SubmitError) -> &'static str {
    match err {
        SubmitError::MalformedEnvelope(_) => {
            "The `tx` field could not be decoded as a base64 XDR TransactionEnvelope."
        }
        SubmitError::SubmissionDisabled => "Transaction submission is disabled on this relay.",
        SubmitError::ReadinessUnavailable => {
            "The core node is not synced with the network. Try again later."
        }
        SubmitError::Request(_) => "The relay could not get an answer from the core node.",
        SubmitError::SubmissionException(_) => {
            "The core node reported an exception while processing the transaction."
        }
        SubmitError::InvalidSubmissionStatus(_) => {
            "The core node returned a submission status this relay does not recognise."
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(CONTENT_TYPE, PROBLEM_CONTENT_TYPE)], Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 while the process is alive.
///
/// Does not consult the core node; that belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Response body for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub network: String,
    pub network_passphrase: String,
    pub core_synced: bool,
    pub submission_enabled: bool,
    pub timestamp: String,
}

/// `GET /status` — relay configuration and the last known core sync state.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        version: state.version.clone(),
        network: state.network.clone(),
        network_passphrase: state.service.network_passphrase().to_string(),
        core_synced: state.service.is_ready(),
        submission_enabled: state.service.is_enabled(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Decoded `key=value` pairs of a query string or urlencoded body, in order.
type FormPairs = Vec<(String, String)>;

/// First `tx` value among `pairs`. Repeated keys are not an error.
fn first_tx(pairs: FormPairs) -> Option<String> {
    pairs.into_iter().find(|(k, _)| k == "tx").map(|(_, v)| v)
}

/// `POST /transactions_async` — forward one envelope to the core node.
///
/// The HTTP status of a successful reply mirrors the node's decision
/// (201, 400, 409 or 503); the body says which. If the client disconnects,
/// hyper drops this future and the in-flight core request with it.
async fn submit_handler(
    State(state): State<AppState>,
    query: Result<Query<FormPairs>, QueryRejection>,
    request: Request,
) -> Response {
    let query_tx = match query {
        Ok(Query(pairs)) => first_tx(pairs),
        Err(e) => return Problem::bad_request(e.body_text()).into_response(),
    };
    let raw = match read_tx_field(query_tx, request).await {
        Ok(raw) => raw,
        Err(problem) => return problem.into_response(),
    };

    let ctx = RequestContext::new();
    match state.service.submit(&ctx, &raw).await {
        Ok(resp) => submission_reply(resp),
        Err(err) => {
            tracing::debug!(
                request_id = %ctx.request_id(),
                error = %err,
                retryable = err.is_retryable(),
                "submission failed"
            );
            Problem::from_submit_error(&err, &raw).into_response()
        }
    }
}

fn submission_reply(resp: SubmissionResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::OK);
    (status, Json(resp)).into_response()
}

/// Extract `tx` according to the request's content type. A body value wins
/// over a query value; a missing field reads as an empty envelope.
async fn read_tx_field(query_tx: Option<String>, request: Request) -> Result<String, Problem> {
    let content_type = match request.headers().get(CONTENT_TYPE) {
        None => String::new(),
        Some(value) => match value.to_str() {
            Ok(v) => v.to_string(),
            Err(_) => {
                return Err(Problem::unsupported_media_type(
                    &String::from_utf8_lossy(value.as_bytes()),
                ))
            }
        },
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let from_body = match mime.as_str() {
        "" => None,
        "application/x-www-form-urlencoded" => {
            let Form(pairs) = Form::<FormPairs>::from_request(request, &())
                .await
                .map_err(|e| Problem::bad_request(e.body_text()))?;
            first_tx(pairs)
        }
        "multipart/form-data" => {
            let mut multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| Problem::bad_request(e.to_string()))?;
            let mut tx = None;
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| Problem::bad_request(e.to_string()))?
            {
                if field.name() == Some("tx") {
                    tx = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| Problem::bad_request(e.to_string()))?,
                    );
                    break;
                }
            }
            tx
        }
        _ => return Err(Problem::unsupported_media_type(&content_type)),
    };

    Ok(from_body.or(query_tx).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use prometheus::Registry;
    use std::sync::Arc;
    use tower::ServiceExt;
    use txsub_protocol::client::mock::MockCoreClient;
    use txsub_protocol::client::{RequestError, TxStatus};
    use txsub_protocol::envelope::fixtures;
    use txsub_protocol::{
        InstrumentedCoreClient, RelayConfig, SubmissionAcknowledgment, SubmissionMetrics,
        SyncState,
    };

    struct TestApp {
        router: Router,
        core: Arc<MockCoreClient>,
        sync: SyncState,
    }

    fn test_app_with(config: RelayConfig, core: MockCoreClient) -> TestApp {
        let core = Arc::new(core);
        let sync = SyncState::synced();
        let metrics = SubmissionMetrics::register(&Registry::new()).unwrap();
        let client = InstrumentedCoreClient::new(core.clone(), metrics);
        let state = AppState {
            version: "0.1.0-test".into(),
            network: "pubnet".into(),
            service: SubmissionService::new(&config, client, Arc::new(sync.clone())),
        };
        TestApp {
            router: create_router(state),
            core,
            sync,
        }
    }

    fn test_app(core: MockCoreClient) -> TestApp {
        test_app_with(RelayConfig::default(), core)
    }

    fn replying(status: TxStatus) -> MockCoreClient {
        MockCoreClient::replying(Ok(SubmissionAcknowledgment::status(status)))
    }

    /// `tx=<raw>`, form-encoded.
    fn form_body(raw: &str) -> String {
        reqwest::Url::parse_with_params("http://relay.test/", [("tx", raw)])
            .unwrap()
            .query()
            .unwrap_or_default()
            .to_string()
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, String, Vec<u8>) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, content_type, body)
    }

    /// Sends a GET request and returns the (status, body_bytes).
    async fn get(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let (status, _, body) = send(router, req).await;
        (status, body)
    }

    /// Submits `raw` as a urlencoded form.
    async fn post_form(router: &Router, raw: &str) -> (StatusCode, String, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri("/transactions_async")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body(raw)))
            .unwrap();
        send(router, req).await
    }

    // -- 1. Health endpoint ----------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = test_app(replying(TxStatus::Pending));
        let (status, body) = get(&app.router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    // -- 2. Status endpoint reflects sync state --------------------------------

    #[tokio::test]
    async fn status_endpoint_reports_core_sync() {
        let app = test_app(replying(TxStatus::Pending));
        let (_, body) = get(&app.router, "/status").await;
        let resp: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert!(resp.core_synced);
        assert!(resp.submission_enabled);
        assert_eq!(resp.network, "pubnet");

        app.sync.set_synced(false);
        let (status, body) = get(&app.router, "/status").await;
        assert_eq!(status, StatusCode::OK);
        let resp: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert!(!resp.core_synced);
    }

    // -- 3. Pending submission over a urlencoded form --------------------------

    #[tokio::test]
    async fn form_submission_pending() {
        let app = test_app(replying(TxStatus::Pending));
        let raw = fixtures::v1_envelope_xdr(1);
        let (status, content_type, body) = post_form(&app.router, &raw).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(content_type.starts_with("application/json"));
        let resp: SubmissionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.tx_status, "PENDING");
        assert_eq!(resp.status, 201);
        assert_eq!(resp.hash.len(), 64);
        assert_eq!(app.core.submissions(), vec![raw]);
    }

    // -- 4. Multipart submission -----------------------------------------------

    #[tokio::test]
    async fn multipart_submission() {
        let app = test_app(replying(TxStatus::Duplicate));
        let raw = fixtures::fee_bump_envelope_xdr(2);
        let body = format!(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"tx\"\r\n\r\n\
             {raw}\r\n\
             --XBOUNDARY--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/transactions_async")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        let (status, _, body) = send(&app.router, req).await;

        assert_eq!(status, StatusCode::CONFLICT);
        let resp: SubmissionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.tx_status, "DUPLICATE");
        assert_eq!(app.core.submissions(), vec![raw]);
    }

    // -- 5. Query string with no content type ----------------------------------

    #[tokio::test]
    async fn query_string_submission() {
        let app = test_app(replying(TxStatus::TryAgainLater));
        let raw = fixtures::v0_envelope_xdr(3);
        let req = Request::builder()
            .method("POST")
            .uri(format!("/transactions_async?{}", form_body(&raw)))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&app.router, req).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let resp: SubmissionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.tx_status, "TRY_AGAIN_LATER");
    }

    // -- 6. JSON bodies are refused --------------------------------------------

    #[tokio::test]
    async fn json_content_type_is_unsupported() {
        let app = test_app(replying(TxStatus::Pending));
        let req = Request::builder()
            .method("POST")
            .uri("/transactions_async")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"tx":"AAAA"}"#))
            .unwrap();
        let (status, content_type, body) = send(&app.router, req).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(content_type, PROBLEM_CONTENT_TYPE);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "unsupported_media_type");
        assert_eq!(app.core.submit_calls(), 0);
    }

    // -- 7. Malformed and missing envelopes ------------------------------------

    #[tokio::test]
    async fn malformed_envelope_is_400() {
        let app = test_app(replying(TxStatus::Pending));
        let (status, content_type, body) = post_form(&app.router, "garbage").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type, PROBLEM_CONTENT_TYPE);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "transaction_malformed");
        assert_eq!(problem.status, 400);
        assert_eq!(problem.extras.unwrap().envelope_xdr, "garbage");
        assert_eq!(app.core.submit_calls(), 0);
    }

    #[tokio::test]
    async fn missing_tx_field_is_malformed() {
        let app = test_app(replying(TxStatus::Pending));
        let req = Request::builder()
            .method("POST")
            .uri("/transactions_async")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("memo=hello"))
            .unwrap();
        let (status, _, body) = send(&app.router, req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "transaction_malformed");
    }

    // -- 8. Disabled submission ------------------------------------------------

    #[tokio::test]
    async fn disabled_submission_is_405_and_echoes_envelope() {
        let config = RelayConfig {
            disable_tx_sub: true,
            ..RelayConfig::default()
        };
        let app = test_app_with(config, replying(TxStatus::Pending));
        let raw = fixtures::v1_envelope_xdr(4);
        let (status, _, body) = post_form(&app.router, &raw).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "transaction_submission_disabled");
        assert_eq!(problem.extras.unwrap().envelope_xdr, raw);
    }

    // -- 9. Unsynced core ------------------------------------------------------

    #[tokio::test]
    async fn unsynced_core_is_503() {
        let app = test_app(replying(TxStatus::Pending));
        app.sync.set_synced(false);
        let (status, _, body) = post_form(&app.router, &fixtures::v1_envelope_xdr(5)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "stale_history");
        assert_eq!(app.core.submit_calls(), 0);
    }

    // -- 10. Rejected transaction echoes the result ----------------------------

    #[tokio::test]
    async fn error_status_echoes_result_xdr() {
        let app = test_app(MockCoreClient::replying(Ok(SubmissionAcknowledgment::error(
            "AAAAAAAAAGT////7AAAAAA==",
            None,
        ))));
        let (status, _, body) = post_form(&app.router, &fixtures::v1_envelope_xdr(6)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["tx_status"], "ERROR");
        assert_eq!(json["errorResultXdr"], "AAAAAAAAAGT////7AAAAAA==");
        assert!(json.get("diagnosticEventsXdr").is_none());
    }

    // -- 11. Upstream failures are 502 -----------------------------------------

    #[tokio::test]
    async fn upstream_failures_are_502() {
        let app = test_app(
            MockCoreClient::replying(Err(RequestError::UnexpectedStatus(500))).with_queue([
                Ok(SubmissionAcknowledgment::Exception("bad blob".into())),
                Ok(SubmissionAcknowledgment::status(TxStatus::Unknown("HUH".into()))),
            ]),
        );
        let raw = fixtures::v1_envelope_xdr(7);

        let mut types = Vec::new();
        for _ in 0..3 {
            let (status, _, body) = post_form(&app.router, &raw).await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            let problem: Problem = serde_json::from_slice(&body).unwrap();
            types.push(problem.problem_type);
        }
        assert_eq!(
            types,
            vec![
                "transaction_submission_exception",
                "transaction_submission_invalid_status",
                "transaction_submission_failed",
            ]
        );
    }

    // -- 12. Unreadable content type is refused --------------------------------

    #[tokio::test]
    async fn non_ascii_content_type_is_unsupported() {
        let app = test_app(replying(TxStatus::Pending));
        let raw = fixtures::v1_envelope_xdr(8);
        let req = Request::builder()
            .method("POST")
            .uri(format!("/transactions_async?{}", form_body(&raw)))
            .header(
                CONTENT_TYPE,
                axum::http::HeaderValue::from_bytes(b"application/json\xff").unwrap(),
            )
            .body(Body::from("{}"))
            .unwrap();
        let (status, content_type, body) = send(&app.router, req).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(content_type, PROBLEM_CONTENT_TYPE);
        let problem: Problem = serde_json::from_slice(&body).unwrap();
        assert_eq!(problem.problem_type, "unsupported_media_type");
        assert_eq!(app.core.submit_calls(), 0);
    }

    // -- 13. Repeated `tx` keys use the first value ----------------------------

    #[tokio::test]
    async fn repeated_tx_uses_first_value() {
        let app = test_app(replying(TxStatus::Pending));
        let raw = fixtures::v1_envelope_xdr(9);

        let req = Request::builder()
            .method("POST")
            .uri(format!("/transactions_async?{}&tx=x", form_body(&raw)))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::CREATED);

        let req = Request::builder()
            .method("POST")
            .uri("/transactions_async")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("{}&tx=x", form_body(&raw))))
            .unwrap();
        let (status, _, _) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::CREATED);

        assert_eq!(app.core.submissions(), vec![raw.clone(), raw]);
    }
}
