//! OpenRouter chat-completions client.
//!
//! DESIGN
//! ======
//! Thin HTTP wrapper for `POST /chat/completions`, one-shot and streaming.
//! Streaming responses arrive as SSE `data:` lines carrying delta chunks;
//! `parse_sse_line` keeps that parsing pure for testability. Two HTTP clients
//! are held: the one-shot client carries the full request timeout, while the
//! streaming client keeps only the connect timeout so a long generation is
//! not killed mid-body.

use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;

use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::config::AiConfig;
use super::types::{ChatGateway, GatewayError, TokenStream};

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenRouterClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    /// Build the gateway client from parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if either underlying HTTP client fails to build.
    pub fn new(config: &AiConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        let stream_http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            stream_http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    async fn send(
        &self,
        client: &reqwest::Client,
        body: &ApiRequest<'_>,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response
                .text()
                .await
                .map_err(|e| GatewayError::ApiRequest(e.to_string()))?;
            return Err(GatewayError::ApiResponse { status, body });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl ChatGateway for OpenRouterClient {
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, GatewayError> {
        let body = ApiRequest::one_shot(model, system, user);
        let response = self.send(&self.http, &body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::ApiRequest(e.to_string()))?;
        parse_completion(&text)
    }

    async fn open_stream(&self, model: &str, system: &str, user: &str) -> Result<TokenStream, GatewayError> {
        let body = ApiRequest::streaming(model, system, user);
        let response = self.send(&self.stream_http, &body).await?;
        Ok(delta_stream(Box::pin(response.bytes_stream())))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ApiRequest<'a> {
    fn one_shot(model: &'a str, system: &'a str, user: &'a str) -> Self {
        Self {
            model,
            messages: [
                WireMessage { role: "system", content: system },
                WireMessage { role: "user", content: user },
            ],
            stream: false,
        }
    }

    fn streaming(model: &'a str, system: &'a str, user: &'a str) -> Self {
        Self { stream: true, ..Self::one_shot(model, system, user) }
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

pub(crate) fn parse_completion(json_text: &str) -> Result<String, GatewayError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| GatewayError::ApiParse(e.to_string()))?;
    root.get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| GatewayError::ApiParse("missing choices[0].message.content".to_string()))
}

/// One parsed SSE line from a streaming response.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseLine {
    /// Keep-alive comment, non-data field, empty delta, or unparseable chunk.
    Skip,
    /// The `data: [DONE]` terminator.
    Done,
    /// A non-empty text fragment.
    Delta(String),
}

pub(crate) fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return SseLine::Skip;
    }
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim_start();
    if payload == "[DONE]" {
        return SseLine::Done;
    }

    let Ok(chunk) = serde_json::from_str::<Value>(payload) else {
        warn!(len = payload.len(), "discarding unparseable stream chunk");
        return SseLine::Skip;
    };
    match chunk
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => SseLine::Delta(text.to_string()),
        _ => SseLine::Skip,
    }
}

struct SseState<S> {
    bytes: S,
    buf: String,
    pending: VecDeque<String>,
    done: bool,
}

/// Convert a raw SSE byte stream into text deltas. Bytes may split a line at
/// any point, so complete lines are drained out of an accumulation buffer.
/// The stream ends at `data: [DONE]` or transport EOF; a read error is
/// yielded once and terminates the stream.
fn delta_stream<S, B, E>(bytes: S) -> TokenStream
where
    S: Stream<Item = Result<B, E>> + Unpin + Send + 'static,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = SseState { bytes, buf: String::new(), pending: VecDeque::new(), done: false };
    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(text) = state.pending.pop_front() {
                return Some((Ok(text), state));
            }
            if state.done {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buf.push_str(&String::from_utf8_lossy(chunk.as_ref()));
                    while let Some(pos) = state.buf.find('\n') {
                        let line: String = state.buf.drain(..=pos).collect();
                        match parse_sse_line(&line) {
                            SseLine::Delta(text) => state.pending.push_back(text),
                            SseLine::Done => state.done = true,
                            SseLine::Skip => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(GatewayError::StreamRead(e.to_string())), state));
                }
                None => state.done = true,
            }
        }
    }))
}
