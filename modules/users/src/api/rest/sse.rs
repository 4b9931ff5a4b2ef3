use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use crate::infra::events::{BroadcastEventPublisher, UserEventPayload};

/// `event:` name attached to every user event on the SSE stream.
pub const USER_EVENT_NAME: &str = "user_event";

fn to_sse_event(payload: &UserEventPayload) -> Event {
    Event::default()
        .event(USER_EVENT_NAME)
        .json_data(payload)
        .unwrap_or_else(|_| {
            // Fallback to a tiny text marker instead of breaking the stream.
            Event::default()
                .event(USER_EVENT_NAME)
                .data("serialization_error")
        })
}

/// Live SSE stream of user events, with periodic keepalive pings.
pub fn user_events_response(
    publisher: &BroadcastEventPublisher,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = publisher
        .subscribe_stream()
        .map(|payload| Ok(to_sse_event(&payload)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}
