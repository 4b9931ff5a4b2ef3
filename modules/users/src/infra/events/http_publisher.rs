use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use crate::contract::context::RequestCtx;
use crate::domain::events::UserDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::infra::events::payload::UserEventPayload;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const EVENT_TYPE_HEADER: &str = "x-event-type";
pub const EXCHANGE_HEADER: &str = "x-event-exchange";

/// HTTP adapter implementing the EventPublisher port.
///
/// Every event is POSTed as JSON to a single endpoint (a broker ingress or a
/// webhook). One attempt per event; a non-2xx status is an error.
pub struct HttpEventPublisher {
    client: reqwest::Client,
    endpoint: Url,
    exchange: String,
}

impl HttpEventPublisher {
    pub fn new(endpoint: Url, exchange: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build event HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            exchange: exchange.into(),
        })
    }
}

#[async_trait]
impl EventPublisher<UserDomainEvent> for HttpEventPublisher {
    #[instrument(
        name = "users.http.events.publish",
        skip_all,
        fields(endpoint = %self.endpoint, event = %event.kind(), user_id = %event.user_id())
    )]
    async fn publish(&self, ctx: &RequestCtx, event: &UserDomainEvent) -> anyhow::Result<()> {
        let payload = UserEventPayload::from(event);

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(EVENT_TYPE_HEADER, event.kind().as_str())
            .header(EXCHANGE_HEADER, self.exchange.as_str())
            .json(&payload);
        if let Some(id) = ctx.correlation_id() {
            request = request.header(CORRELATION_ID_HEADER, id);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("event endpoint responded with HTTP {status}");
        }
        Ok(())
    }
}
