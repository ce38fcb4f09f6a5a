//! LLM gateway — OpenRouter adapter for AI tutoring features.
//!
//! DESIGN
//! ======
//! All model traffic goes through one OpenAI-compatible gateway (OpenRouter),
//! so a single client covers every candidate model in the fallback list. The
//! `ChatGateway` trait is the seam the resilience layer and the tests mock;
//! `OpenRouterClient` is the only production implementation.

pub mod config;
pub mod openrouter;
pub mod types;

pub use config::AiConfig;
pub use openrouter::OpenRouterClient;
pub use types::{ChatGateway, GatewayError, TokenStream};
