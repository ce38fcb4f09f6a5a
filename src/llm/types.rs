//! Gateway types — errors, the token stream alias, and the mockable trait.

use futures::stream::BoxStream;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request to the gateway failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The gateway returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The gateway response body could not be interpreted.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// An already-open token stream failed while being read.
    #[error("stream read failed: {0}")]
    StreamRead(String),
}

// =============================================================================
// TOKEN STREAM
// =============================================================================

/// A live token stream: incremental text fragments until the backend signals
/// completion, or an error item where the transport gave out. Dropping the
/// stream cancels the request.
pub type TokenStream = BoxStream<'static, Result<String, GatewayError>>;

// =============================================================================
// GATEWAY TRAIT
// =============================================================================

/// Gateway-neutral async trait for chat generation. Enables mocking in tests.
///
/// Both methods take the composed system instruction and the raw user prompt;
/// conversation context never leaks into the user turn.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// One-shot generation: returns the complete response text.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the request fails, the response status is
    /// non-success, or the body is malformed.
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, GatewayError>;

    /// Open a live token stream. A stream either opens or it doesn't; failures
    /// after a successful open surface as `Err` items on the stream itself.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the stream cannot be established.
    async fn open_stream(&self, model: &str, system: &str, user: &str) -> Result<TokenStream, GatewayError>;
}
