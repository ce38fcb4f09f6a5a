//! Gateway configuration parsed from environment variables.

use std::time::Duration;

use super::types::GatewayError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_BACKOFF_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-model attempt bound for one-shot generation. Always >= 1.
    pub max_attempts: u32,
    /// Fixed delay between failed attempts on the same model.
    pub backoff: Duration,
    /// Prioritized model list. May be empty; the resolver substitutes the
    /// built-in default at request time.
    pub models: Vec<String>,
    pub timeouts: GatewayTimeouts,
}

impl AiConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY`
    ///
    /// Optional:
    /// - `OPENROUTER_BASE_URL`: default OpenRouter API base URL
    /// - `AI_RETRIES`: per-model attempts, default 2 (non-numeric or zero
    ///   coerces back to 2)
    /// - `AI_RETRY_BACKOFF_MS`: default 1000
    /// - `AI_MODEL_LIST`: comma-separated model priority list
    /// - `AI_REQUEST_TIMEOUT_SECS`: default 120
    /// - `AI_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error only when the API key is missing; every other value
    /// degrades to its default.
    pub fn from_env() -> Result<Self, GatewayError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| GatewayError::MissingApiKey { var: "OPENROUTER_API_KEY".into() })?;

        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let max_attempts = parse_max_attempts(std::env::var("AI_RETRIES").ok().as_deref());
        let backoff = Duration::from_millis(env_parse_u64("AI_RETRY_BACKOFF_MS", DEFAULT_BACKOFF_MS));
        let models = parse_model_list(&std::env::var("AI_MODEL_LIST").unwrap_or_default());
        let timeouts = GatewayTimeouts {
            request_secs: env_parse_u64("AI_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("AI_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, base_url, max_attempts, backoff, models, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Coerce the raw `AI_RETRIES` value into a valid attempt bound: missing,
/// non-numeric, or zero all fall back to the default of 2.
pub(crate) fn parse_max_attempts(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(DEFAULT_MAX_ATTEMPTS)
}

/// Split a comma-separated model list, trimming entries and dropping empties.
/// The result may be empty; callers fall back to [`DEFAULT_MODEL`].
pub(crate) fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
