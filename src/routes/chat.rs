//! Chat routes — SSE streaming for the global and ticket-scoped assistants.
//!
//! DESIGN
//! ======
//! Both endpoints return a `text/event-stream` body whose frames mirror the
//! adapter's event sequence: `data: {"text": ...}` per fragment, then either
//! `data: [DONE]` or a single `data: {"error": ...}`. The error frame is how
//! every failure reaches the browser; the connection never hangs open after
//! a terminal event.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::services::stream::{self, StreamEvent};
use crate::services::ticket;
use crate::state::AppState;

pub const TICKET_NOT_FOUND_MESSAGE: &str = "Ticket not found";
pub const TICKET_LOOKUP_FAILED_MESSAGE: &str = "Ticket lookup failed. Please try again.";

#[derive(Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

/// `POST /chat/global/stream` — stream a tutoring response for a general
/// question.
pub async fn global_stream(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<ChatMessage>,
) -> Response {
    if let Err(e) = state.rate_limiter.check_and_record(addr.ip()) {
        warn!(client = %addr.ip(), error = %e, "global chat rate limited");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    let instruction = state.composer.global(&body.message);
    let opened = state.ai.open_stream(&instruction, None).await;
    sse_response(stream::events(opened))
}

/// `POST /chat/ticket/{ticket_id}/stream` — stream a response scoped to one
/// ticket. An unknown id produces a single error event; no AI call is made.
pub async fn ticket_stream(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(ticket_id): Path<Uuid>,
    Json(body): Json<ChatMessage>,
) -> Response {
    if let Err(e) = state.rate_limiter.check_and_record(addr.ip()) {
        warn!(client = %addr.ip(), error = %e, "ticket chat rate limited");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    info!(%ticket_id, "starting ticket chat stream");
    match ticket::find_ticket(&state.pool, ticket_id).await {
        Ok(Some(row)) => {
            let instruction = state.composer.ticket(&body.message, &row.context());
            let opened = state.ai.open_stream(&instruction, None).await;
            sse_response(stream::events(opened))
        }
        Ok(None) => {
            warn!(%ticket_id, "ticket chat for unknown ticket");
            sse_response(stream::error_events(TICKET_NOT_FOUND_MESSAGE))
        }
        Err(e) => {
            error!(%ticket_id, error = %e, "ticket lookup failed");
            sse_response(stream::error_events(TICKET_LOOKUP_FAILED_MESSAGE))
        }
    }
}

// =============================================================================
// SSE SERIALIZATION
// =============================================================================

fn sse_response(events: impl Stream<Item = StreamEvent> + Send + 'static) -> Response {
    Sse::new(events.map(|event| Ok::<_, Infallible>(Event::default().data(event_payload(&event)))))
        .into_response()
}

/// The `data:` payload for one event, as the browser client expects it.
fn event_payload(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Text(text) => json!({ "text": text }).to_string(),
        StreamEvent::Error(message) => json!({ "error": message }).to_string(),
        StreamEvent::Done => "[DONE]".to_string(),
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
