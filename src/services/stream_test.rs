use super::*;
use crate::llm::GatewayError;
use futures::StreamExt;

fn token_stream(items: Vec<Result<&'static str, &'static str>>) -> TokenStream {
    Box::pin(futures::stream::iter(items.into_iter().map(|item| {
        item.map(str::to_string)
            .map_err(|e| GatewayError::StreamRead(e.to_string()))
    })))
}

async fn collect(opened: Result<TokenStream, AiError>) -> Vec<StreamEvent> {
    events(opened).collect().await
}

// =========================================================================
// success path
// =========================================================================

#[tokio::test]
async fn tokens_then_done() {
    let produced = collect(Ok(token_stream(vec![Ok("hel"), Ok("lo")]))).await;
    assert_eq!(
        produced,
        vec![
            StreamEvent::Text("hel".to_string()),
            StreamEvent::Text("lo".to_string()),
            StreamEvent::Done,
        ]
    );
}

#[tokio::test]
async fn empty_fragments_are_skipped() {
    let produced = collect(Ok(token_stream(vec![Ok(""), Ok("only"), Ok("")]))).await;
    assert_eq!(produced, vec![StreamEvent::Text("only".to_string()), StreamEvent::Done]);
}

#[tokio::test]
async fn empty_stream_is_just_done() {
    let produced = collect(Ok(token_stream(vec![]))).await;
    assert_eq!(produced, vec![StreamEvent::Done]);
}

// =========================================================================
// failure paths
// =========================================================================

#[tokio::test]
async fn open_failure_is_a_single_error_event() {
    let produced = collect(Err(AiError::StreamOpen)).await;
    assert_eq!(produced, vec![StreamEvent::Error(OPEN_FAILED_MESSAGE.to_string())]);
}

#[tokio::test]
async fn mid_stream_failure_terminates_with_error() {
    let produced = collect(Ok(token_stream(vec![Ok("partial"), Err("reset"), Ok("never seen")]))).await;
    assert_eq!(
        produced,
        vec![
            StreamEvent::Text("partial".to_string()),
            StreamEvent::Error(INTERRUPTED_MESSAGE.to_string()),
        ]
    );
}

#[tokio::test]
async fn immediate_failure_is_error_without_done() {
    let produced = collect(Ok(token_stream(vec![Err("reset")]))).await;
    assert_eq!(produced, vec![StreamEvent::Error(INTERRUPTED_MESSAGE.to_string())]);
}

// =========================================================================
// terminal invariant
// =========================================================================

#[tokio::test]
async fn every_sequence_ends_in_exactly_one_terminal_event() {
    let cases: Vec<Vec<StreamEvent>> = vec![
        collect(Ok(token_stream(vec![Ok("a"), Ok("b")]))).await,
        collect(Ok(token_stream(vec![Ok("a"), Err("boom")]))).await,
        collect(Ok(token_stream(vec![]))).await,
        collect(Err(AiError::StreamOpen)).await,
        error_events("Ticket not found").collect().await,
    ];

    for produced in cases {
        let terminals = produced
            .iter()
            .filter(|e| matches!(e, StreamEvent::Done | StreamEvent::Error(_)))
            .count();
        assert_eq!(terminals, 1, "sequence {produced:?} must have one terminal event");
        assert!(
            matches!(produced.last(), Some(StreamEvent::Done | StreamEvent::Error(_))),
            "terminal event must come last in {produced:?}"
        );
    }
}

#[tokio::test]
async fn error_events_is_a_single_error() {
    let produced: Vec<StreamEvent> = error_events("Ticket not found").collect().await;
    assert_eq!(produced, vec![StreamEvent::Error("Ticket not found".to_string())]);
}
