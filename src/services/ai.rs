//! AI resilience layer — model fallback routing with bounded retries.
//!
//! DESIGN
//! ======
//! Every AI request walks a prioritized candidate list. One-shot generation
//! gives each candidate up to `max_attempts` tries with a fixed backoff
//! between failures; streaming gives each candidate exactly one open attempt,
//! because a partially-consumed stream cannot be retried safely. The first
//! success short-circuits the whole list.
//!
//! ERROR HANDLING
//! ==============
//! One-shot generation never fails: total exhaustion degrades to a literal
//! fallback string so ticket creation is never blocked by the AI backend.
//! Streaming reports total failure as a typed error the stream adapter turns
//! into a user-visible error event. Raw gateway error text stays in the logs.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::llm::config::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL};
use crate::llm::{ChatGateway, TokenStream};

use super::prompt::ChatInstruction;

/// Returned by the one-shot path when every candidate model is exhausted.
/// Doubles as the persisted failure marker on ticket summaries.
pub const GENERATION_FALLBACK: &str = "AI summary generation failed.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// All permitted attempts for one candidate model failed.
    #[error("model {model} exhausted after {attempts} attempt(s)")]
    Exhausted { model: String, attempts: u32 },

    /// Every candidate model refused to open a stream.
    #[error("all chat models failed to open a stream")]
    StreamOpen,

    /// An already-open stream failed while being consumed.
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),
}

/// Per-model retry bounds for one-shot generation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Always >= 1; [`AiService::new`] clamps.
    pub max_attempts: u32,
    /// Fixed delay between failed attempts on the same model.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

// =============================================================================
// MODEL RESOLUTION
// =============================================================================

/// Build the ordered candidate list for one request. Total: an explicit
/// override becomes a singleton list, an empty configured list falls back to
/// the built-in default model, and the result is never empty.
pub fn resolve_models(configured: &[String], override_model: Option<&str>) -> Vec<String> {
    if let Some(model) = override_model {
        let model = model.trim();
        if !model.is_empty() {
            return vec![model.to_string()];
        }
    }
    if configured.is_empty() {
        vec![DEFAULT_MODEL.to_string()]
    } else {
        configured.to_vec()
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Fallback orchestrator over an injected gateway. Stateless apart from
/// read-only configuration; shared across requests via `Arc` in `AppState`.
pub struct AiService {
    gateway: Arc<dyn ChatGateway>,
    models: Vec<String>,
    policy: RetryPolicy,
}

impl AiService {
    #[must_use]
    pub fn new(gateway: Arc<dyn ChatGateway>, models: Vec<String>, policy: RetryPolicy) -> Self {
        let policy = RetryPolicy { max_attempts: policy.max_attempts.max(1), ..policy };
        Self { gateway, models, policy }
    }

    /// One-shot generation with retry and fallback routing.
    ///
    /// Walks the candidate list in priority order, giving each model up to
    /// `max_attempts` tries. Always yields displayable text: total exhaustion
    /// returns [`GENERATION_FALLBACK`] instead of an error.
    pub async fn generate(&self, instruction: &ChatInstruction, override_model: Option<&str>) -> String {
        let candidates = resolve_models(&self.models, override_model);
        for model in &candidates {
            match self.attempt_model(model, instruction).await {
                Ok(content) => return content,
                Err(e) => warn!(%model, error = %e, "trying next fallback model"),
            }
        }
        error!(candidates = candidates.len(), "every candidate model exhausted");
        GENERATION_FALLBACK.to_string()
    }

    /// Run all permitted attempts against a single model.
    async fn attempt_model(&self, model: &str, instruction: &ChatInstruction) -> Result<String, AiError> {
        let attempts = self.policy.max_attempts;
        for attempt in 1..=attempts {
            info!(%model, attempt, max = attempts, "ai: one-shot attempt");
            match self
                .gateway
                .complete(model, &instruction.system, &instruction.user)
                .await
            {
                Ok(content) => {
                    info!(%model, attempt, "ai: one-shot success");
                    return Ok(content);
                }
                Err(e) => {
                    warn!(%model, attempt, error = %e, "ai: one-shot attempt failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.backoff).await;
                    }
                }
            }
        }
        Err(AiError::Exhausted { model: model.to_string(), attempts })
    }

    /// Open a live token stream, falling back across candidates.
    ///
    /// Each candidate gets exactly one open attempt — a stream either opens
    /// or it doesn't, and a partially-consumed stream is never retried.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::StreamOpen`] when every candidate fails to open.
    pub async fn open_stream(
        &self,
        instruction: &ChatInstruction,
        override_model: Option<&str>,
    ) -> Result<TokenStream, AiError> {
        let candidates = resolve_models(&self.models, override_model);
        for model in &candidates {
            info!(%model, "ai: opening stream");
            match self
                .gateway
                .open_stream(model, &instruction.system, &instruction.user)
                .await
            {
                Ok(stream) => {
                    info!(%model, "ai: stream established");
                    return Ok(stream);
                }
                Err(e) => warn!(%model, error = %e, "ai: stream open failed, trying next fallback"),
            }
        }
        error!(candidates = candidates.len(), "every candidate model failed to open a stream");
        Err(AiError::StreamOpen)
    }
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
