use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::warn;

use crate::state::AppState;

/// GET /v1/admin/events
///
/// Live feed of quote, override and rate activity. Each SSE event is named
/// after the event topic and carries the JSON payload.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(|message| match message {
        Ok(event) => Event::default()
            .event(event.topic())
            .json_data(&event)
            .ok()
            .map(Ok),
        Err(lagged) => {
            warn!("Event subscriber lagging: {}", lagged);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
