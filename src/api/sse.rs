//! Server-Sent Events support

use crate::orchestrator::{ChatEvent, PUBLIC_ERROR_MESSAGE};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::DropGuard;

/// Turn the orchestrator's event channel into an SSE response body.
///
/// `first` was already received by the handler. `guard` cancels the run
/// when the client goes away and the stream is dropped.
pub fn sse_stream(
    first: ChatEvent,
    rx: mpsc::Receiver<ChatEvent>,
    guard: DropGuard,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = stream::once(async move { first })
        .chain(ReceiverStream::new(rx))
        .map(move |event| {
            let _ = &guard;
            Ok(chat_event_to_axum(&event))
        });

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn chat_event_to_axum(event: &ChatEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|_| {
        json!({ "type": "error", "message": PUBLIC_ERROR_MESSAGE }).to_string()
    });
    Event::default().event(event.event_type()).data(data)
}
