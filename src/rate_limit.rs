//! In-memory rate limiting for ticket and chat endpoints.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<IpAddr, VecDeque<Instant>>`,
//! keyed by client IP. One limit is enforced: 10 requests per minute per
//! client (env-tunable). Requests over the limit are rejected with 429 before
//! any AI or database work happens.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const DEFAULT_PER_CLIENT_LIMIT: usize = 10;
const DEFAULT_PER_CLIENT_WINDOW_SECS: u64 = 60;

#[derive(Clone, Copy)]
struct RateLimitConfig {
    limit: usize,
    window: Duration,
}

impl RateLimitConfig {
    fn from_env() -> Self {
        let window_secs = env_parse("RATE_LIMIT_PER_CLIENT_WINDOW_SECS", DEFAULT_PER_CLIENT_WINDOW_SECS);
        Self {
            limit: env_parse("RATE_LIMIT_PER_CLIENT", DEFAULT_PER_CLIENT_LIMIT),
            window: Duration::from_secs(window_secs),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded (max {limit} requests/{window_secs}s)")]
    Exceeded { limit: usize, window_secs: u64 },
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            config: RateLimitConfig::from_env(),
        }
    }

    /// Check the client's window, then record the request.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] when the client is over its limit.
    pub fn check_and_record(&self, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, client: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        let deque = inner.entry(client).or_default();
        prune_window(deque, now, cfg.window);
        if deque.len() >= cfg.limit {
            return Err(RateLimitError::Exceeded {
                limit: cfg.limit,
                window_secs: cfg.window.as_secs(),
            });
        }

        deque.push_back(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
