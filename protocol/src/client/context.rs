//! Per-request cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::RequestError;

/// Carries a request's identity, its cancellation signal, and its deadline
/// into every outbound call made on its behalf.
///
/// Cloning is cheap; clones share the same cancellation token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// A fresh context with a random request id, no deadline, and its own
    /// cancellation token.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Bound the context to `timeout` from now. An earlier existing deadline
    /// is kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// Tie the context to an externally owned token, e.g. the shutdown token
    /// of a background task. Work running under [`run`](Self::run) stops as
    /// soon as the token is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drive `fut` to completion unless the context is cancelled or its
    /// deadline passes first.
    ///
    /// Cancellation is checked first, so an already-cancelled context never
    /// polls `fut`. When either fires, `fut` is dropped, which releases any
    /// connection it was holding.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, RequestError>
    where
        F: Future<Output = Result<T, RequestError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .unwrap_or(Err(RequestError::Timeout)),
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RequestError::Cancelled),
            result = bounded => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn completes_without_deadline() {
        let ctx = RequestContext::new();
        let out = ctx.run(async { Ok::<_, RequestError>(7) }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let ctx = RequestContext::new();
        let out: Result<(), _> = ctx
            .run(async { Err(RequestError::UnexpectedStatus(500)) })
            .await;
        assert_eq!(out, Err(RequestError::UnexpectedStatus(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_elapses() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(50));
        let out: Result<(), _> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert_eq!(out, Err(RequestError::Timeout));
    }

    #[tokio::test]
    async fn cancelled_context_never_polls() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let out: Result<(), _> = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(out, Err(RequestError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_interrupts_in_flight_call() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let out: Result<(), _> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .await;
        canceller.await.unwrap();
        assert_eq!(out, Err(RequestError::Cancelled));
    }

    #[test]
    fn earlier_deadline_wins() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let short = RequestContext::new().with_timeout(Duration::from_millis(10));
            let first = short.deadline().unwrap();
            let widened = short.with_timeout(Duration::from_secs(60));
            assert_eq!(widened.deadline(), Some(first));
        });
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(
            RequestContext::new().request_id(),
            RequestContext::new().request_id()
        );
    }
}
