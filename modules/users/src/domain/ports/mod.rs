use async_trait::async_trait;

use crate::contract::context::RequestCtx;

/// Output port: publish domain events (no knowledge of transport).
///
/// Publication is best-effort. Callers treat an `Err` as something to log,
/// never as a reason to fail the operation that produced the event.
#[async_trait]
pub trait EventPublisher<E>: Send + Sync + 'static {
    async fn publish(&self, ctx: &RequestCtx, event: &E) -> anyhow::Result<()>;
}
