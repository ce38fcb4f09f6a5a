//! Ticket routes — listing and creation.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use crate::services::ticket::{self, NewTicket, TicketError, TicketRow};
use crate::state::AppState;

#[derive(Serialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub ai_summary: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn to_response(row: TicketRow) -> TicketResponse {
    TicketResponse {
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        tags: row.tags,
        image: row.image,
        ai_summary: row.ai_summary,
        created_at: row.created_at,
    }
}

type ErrorBody = (StatusCode, Json<serde_json::Value>);

fn error_body(status: StatusCode, detail: &str) -> ErrorBody {
    (status, Json(json!({ "detail": detail })))
}

/// `GET /tickets` — list all tickets, newest first.
pub async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<TicketResponse>>, StatusCode> {
    let rows = ticket::list_tickets(&state.pool)
        .await
        .map_err(ticket_error_to_status)?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// `POST /tickets` — validate, enrich with an AI summary, persist.
///
/// AI exhaustion does not fail the request: the ticket is stored with the
/// failure-marker summary and creation still returns 201.
pub async fn create_ticket(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<NewTicket>,
) -> Result<(StatusCode, Json<TicketResponse>), ErrorBody> {
    if let Err(e) = state.rate_limiter.check_and_record(addr.ip()) {
        warn!(client = %addr.ip(), error = %e, "ticket creation rate limited");
        return Err(error_body(StatusCode::TOO_MANY_REQUESTS, &e.to_string()));
    }

    if let Err(detail) = ticket::validate_new_ticket(&body) {
        warn!(%detail, "ticket validation failed");
        return Err(error_body(StatusCode::BAD_REQUEST, &detail));
    }

    let row = ticket::create_ticket(&state, body).await.map_err(|e| {
        error!(error = %e, "ticket creation failed");
        error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    })?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub(crate) fn ticket_error_to_status(err: TicketError) -> StatusCode {
    match err {
        TicketError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
