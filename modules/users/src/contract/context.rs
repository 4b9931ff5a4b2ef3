//! Per-request execution context handed to every service operation.
//!
//! Carries an optional correlation id (for logs and outgoing events), an
//! optional deadline and a cancellation token. Collaborator calls are raced
//! against both; work already handed to a collaborator is not rolled back.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a guarded future did not run to completion.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    #[error("request was cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    correlation_id: Option<String>,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl RequestCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.correlation_id = if id.is_empty() { None } else { Some(id) };
        self
    }

    /// Deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `fut` unless the context is cancelled or its deadline passes first.
    ///
    /// Cancellation wins over the deadline, and both win over a future that
    /// would complete in the same poll.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
    where
        F: Future,
    {
        if self.cancel.is_cancelled() {
            return Err(Interrupted::Cancelled);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            _ = deadline => Err(Interrupted::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_completes_without_deadline() {
        let ctx = RequestCtx::new();
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn run_fails_fast_when_cancelled() {
        let token = CancellationToken::new();
        let ctx = RequestCtx::new().with_cancellation(token.clone());
        token.cancel();
        assert_eq!(
            ctx.run(async { 1 }).await,
            Err(Interrupted::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_at_deadline() {
        let ctx = RequestCtx::new().with_timeout(Duration::from_millis(50));
        let slow = tokio::time::sleep(Duration::from_secs(10));
        assert_eq!(ctx.run(slow).await, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_never_polls_the_future() {
        let ctx = RequestCtx::new().with_timeout(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;
        assert_eq!(
            ctx.run(async { "ran" }).await,
            Err(Interrupted::DeadlineExceeded)
        );
    }

    #[test]
    fn deadlines_only_tighten() {
        let now = Instant::now();
        let ctx = RequestCtx::new()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(5));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }

    #[test]
    fn empty_correlation_id_is_absent() {
        assert_eq!(RequestCtx::new().with_correlation_id("").correlation_id(), None);
        assert_eq!(
            RequestCtx::new()
                .with_correlation_id("abc")
                .correlation_id(),
            Some("abc")
        );
    }
}
