//! # Event Stream
//!
//! Server-sent `ViewEvent`s. Idle connections get a heartbeat comment every
//! 15 seconds.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use std::{convert::Infallible, time::Duration};
use tokio::sync::broadcast::error::RecvError;

use crate::SharedState;

const HEARTBEAT: Duration = Duration::from_secs(15);

/// SSE endpoint for view events with heartbeat
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "events",
    responses(
        (status = 200, description = "text/event-stream of ViewEvent JSON")
    )
)]
pub async fn events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.library.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        match tokio::time::timeout(HEARTBEAT, rx.recv()).await {
            Ok(Ok(event)) => {
                let json = serde_json::to_string(&event).unwrap_or_default();
                Some((Ok(Event::default().data(json)), rx))
            }
            Ok(Err(RecvError::Lagged(skipped))) => {
                // Missed events still mean the view changed
                tracing::debug!(skipped, "Event subscriber lagged");
                Some((Ok(Event::default().data(r#"{"kind":"lagged"}"#)), rx))
            }
            // Channel closed
            Ok(Err(RecvError::Closed)) => None,
            Err(_) => Some((Ok(Event::default().comment("heartbeat")), rx)),
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
