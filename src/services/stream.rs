//! Stream adapter — backend token stream to transport-neutral events.
//!
//! DESIGN
//! ======
//! Chat responses reach the client as a lazy, finite event sequence:
//! `Text* → Done` on success, or `Text* → Error` on any failure. The sequence
//! always ends in exactly one terminal event, and nothing follows an `Error`.
//! The adapter owns that invariant so the HTTP layer only does serialization.
//! Dropping the sequence drops the underlying gateway stream, which is the
//! only cancellation path (client disconnect).

use futures::{Stream, StreamExt};
use tracing::warn;

use crate::llm::TokenStream;

use super::ai::AiError;

/// Sent when no candidate model would open a stream.
pub const OPEN_FAILED_MESSAGE: &str = "All chat models currently unavailable. Please try again.";

/// Sent when an established stream dies before completion.
pub const INTERRUPTED_MESSAGE: &str = "AI connection lost mid-stream. Please try again.";

// =============================================================================
// EVENTS
// =============================================================================

/// One event in a chat response sequence. Produced here, consumed exactly
/// once by the transport layer, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A non-empty text fragment.
    Text(String),
    /// Successful completion. Terminal.
    Done,
    /// Failure, already reduced to a displayable message. Terminal.
    Error(String),
}

// =============================================================================
// ADAPTER
// =============================================================================

enum Phase {
    Start(Result<TokenStream, AiError>),
    Streaming(TokenStream),
    Closed,
}

/// Adapt the orchestrator's open result into an event sequence.
///
/// Open failure yields a single `Error`. An open stream yields `Text` for
/// each non-empty fragment, then `Done` on exhaustion — or `Error` at the
/// point of a mid-stream failure, after which the sequence is closed; a
/// partially-consumed stream is never resumed.
pub fn events(opened: Result<TokenStream, AiError>) -> impl Stream<Item = StreamEvent> + Send {
    futures::stream::unfold(Phase::Start(opened), |mut phase| async move {
        loop {
            phase = match phase {
                Phase::Start(Err(e)) => {
                    warn!(error = %e, "chat stream could not be opened");
                    return Some((StreamEvent::Error(OPEN_FAILED_MESSAGE.to_string()), Phase::Closed));
                }
                Phase::Start(Ok(stream)) => Phase::Streaming(stream),
                Phase::Streaming(mut stream) => match stream.next().await {
                    Some(Ok(text)) if !text.is_empty() => {
                        return Some((StreamEvent::Text(text), Phase::Streaming(stream)));
                    }
                    Some(Ok(_)) => Phase::Streaming(stream),
                    Some(Err(e)) => {
                        let interrupted = AiError::StreamInterrupted(e.to_string());
                        warn!(error = %interrupted, "chat stream interrupted");
                        return Some((StreamEvent::Error(INTERRUPTED_MESSAGE.to_string()), Phase::Closed));
                    }
                    None => return Some((StreamEvent::Done, Phase::Closed)),
                },
                Phase::Closed => return None,
            };
        }
    })
}

/// A sequence consisting of a single terminal `Error` — used for failed
/// upstream preconditions (unknown ticket, failed lookup) where no gateway
/// call is ever attempted.
pub fn error_events(message: &str) -> impl Stream<Item = StreamEvent> + Send {
    futures::stream::iter([StreamEvent::Error(message.to_string())])
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
