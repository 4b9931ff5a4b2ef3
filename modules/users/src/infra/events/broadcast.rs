use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use crate::contract::context::RequestCtx;
use crate::domain::events::UserDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::infra::events::payload::UserEventPayload;

/// In-process publisher built on `tokio::sync::broadcast`.
///
/// Bounded: slow subscribers lose the oldest events. Publishing with no
/// subscriber attached is not an error.
#[derive(Clone)]
pub struct BroadcastEventPublisher {
    tx: broadcast::Sender<UserEventPayload>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UserEventPayload> {
        self.tx.subscribe()
    }

    /// Typed stream of payloads; lag errors are dropped.
    pub fn subscribe_stream(&self) -> impl Stream<Item = UserEventPayload> {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move { res.ok() })
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl EventPublisher<UserDomainEvent> for BroadcastEventPublisher {
    async fn publish(&self, _ctx: &RequestCtx, event: &UserDomainEvent) -> anyhow::Result<()> {
        if self.tx.send(UserEventPayload::from(event)).is_err() {
            debug!(event = %event.kind(), "No subscribers for user event");
        }
        Ok(())
    }
}
