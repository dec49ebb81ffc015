//! Scripted [`CoreClient`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ack::{CoreInfo, SubmissionAcknowledgment};
use super::{CoreClient, RequestContext, RequestError};

type Responder =
    Arc<dyn Fn(&str) -> Result<SubmissionAcknowledgment, RequestError> + Send + Sync>;

/// A core node that answers from a script.
///
/// Queued replies are consumed first, in order; after that every submission
/// gets the responder's answer. Each call still goes through the caller's
/// [`RequestContext`], so deadlines and cancellation behave as they would
/// against a real node.
pub struct MockCoreClient {
    queued: Mutex<VecDeque<Result<SubmissionAcknowledgment, RequestError>>>,
    responder: Responder,
    info: Mutex<Result<CoreInfo, RequestError>>,
    latency: Option<Duration>,
    submissions: Mutex<Vec<String>>,
    submit_calls: AtomicUsize,
    info_calls: AtomicUsize,
}

impl MockCoreClient {
    /// Always reply with `reply`.
    pub fn replying(reply: Result<SubmissionAcknowledgment, RequestError>) -> Self {
        Self::from_fn(move |_| reply.clone())
    }

    /// Reply with whatever `f` returns for the submitted envelope text.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<SubmissionAcknowledgment, RequestError> + Send + Sync + 'static,
    {
        Self {
            queued: Mutex::new(VecDeque::new()),
            responder: Arc::new(f),
            info: Mutex::new(Ok(CoreInfo {
                state: crate::config::CORE_SYNCED_STATE.to_string(),
                ..CoreInfo::default()
            })),
            latency: None,
            submissions: Mutex::new(Vec::new()),
            submit_calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
        }
    }

    /// Replies served once each, ahead of the responder.
    pub fn with_queue(
        self,
        replies: impl IntoIterator<Item = Result<SubmissionAcknowledgment, RequestError>>,
    ) -> Self {
        self.queued.lock().extend(replies);
        self
    }

    /// Delay every reply by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_info(&self, info: Result<CoreInfo, RequestError>) {
        *self.info.lock() = info;
    }

    /// Number of `submit_transaction` calls observed, including ones that
    /// were later cancelled or timed out.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Envelope texts received, in arrival order.
    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().clone()
    }

    fn next_reply(&self, raw: &str) -> Result<SubmissionAcknowledgment, RequestError> {
        if let Some(reply) = self.queued.lock().pop_front() {
            return reply;
        }
        (self.responder)(raw)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CoreClient for MockCoreClient {
    async fn submit_transaction(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<SubmissionAcknowledgment, RequestError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().push(raw.to_string());
        ctx.run(async {
            self.delay().await;
            self.next_reply(raw)
        })
        .await
    }

    async fn info(&self, ctx: &RequestContext) -> Result<CoreInfo, RequestError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        ctx.run(async {
            self.delay().await;
            let info = self.info.lock().clone();
            info
        })
        .await
    }
}
