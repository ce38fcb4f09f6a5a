//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the ticket CRUD and chat streaming endpoints under a single Axum
//! router with permissive CORS. Handlers receive `AppState` via the `State`
//! extractor and the client address via `ConnectInfo` for rate limiting.

pub mod chat;
pub mod tickets;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tickets", get(tickets::list_tickets).post(tickets::create_ticket))
        .route("/chat/global/stream", post(chat::global_stream))
        .route("/chat/ticket/{ticket_id}/stream", post(chat::ticket_stream))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
