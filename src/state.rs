//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. All
//! components are constructed once in `main` and dependency-injected here;
//! nothing reads ambient globals after startup. Everything is read-only per
//! request except the rate limiter, which owns its own lock.

use std::sync::Arc;

use sqlx::PgPool;

use crate::rate_limit::RateLimiter;
use crate::services::ai::AiService;
use crate::services::prompt::PromptComposer;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Fallback orchestrator over the configured gateway.
    pub ai: Arc<AiService>,
    /// Prompt composer holding the style rules loaded at startup.
    pub composer: Arc<PromptComposer>,
    /// In-memory per-client rate limiter.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, ai: AiService, composer: PromptComposer) -> Self {
        Self {
            pool,
            ai: Arc::new(ai),
            composer: Arc::new(composer),
            rate_limiter: RateLimiter::new(),
        }
    }
}
