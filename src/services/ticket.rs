//! Ticket service — CRUD plus synchronous AI summary enrichment.
//!
//! DESIGN
//! ======
//! Every created ticket gets a one-shot AI summary before it is persisted, so
//! readers always see immediate context. Summarization runs before any
//! database work: the retry backoff must not hold a pool connection, and the
//! one-shot path degrades to a failure-marker string instead of erroring, so
//! ticket creation never fails on the AI backend.

use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

use super::prompt::{PromptComposer, TicketContext};

pub const VALID_CATEGORIES: [&str; 7] =
    ["AI", "Podcast", "Education", "Programming", "Science", "Math", "Other"];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored ticket. Mirrors the `tickets` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TicketRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub ai_summary: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TicketRow {
    /// Snapshot consumed by ticket-chat prompt composition.
    #[must_use]
    pub fn context(&self) -> TicketContext {
        TicketContext {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            ai_summary: self.ai_summary.clone(),
        }
    }
}

/// Incoming ticket submission body.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate a submission before it reaches persistence or the AI core.
///
/// # Errors
///
/// Returns the client-facing detail message for the first failed check.
pub fn validate_new_ticket(ticket: &NewTicket) -> Result<(), String> {
    if ticket.title.trim().len() < 5 {
        return Err("Title must be at least 5 characters long.".to_string());
    }
    if ticket.description.trim().len() < 10 {
        return Err("Description must be at least 10 characters long.".to_string());
    }
    if !VALID_CATEGORIES.contains(&ticket.category.as_str()) {
        return Err(format!("Invalid category. Must be one of: {}", VALID_CATEGORIES.join(", ")));
    }
    Ok(())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// List all tickets, newest first.
///
/// # Errors
///
/// Returns [`TicketError::Database`] if the query fails.
pub async fn list_tickets(pool: &PgPool) -> Result<Vec<TicketRow>, TicketError> {
    let rows = sqlx::query_as::<_, TicketRow>(
        "SELECT id, title, description, category, tags, image, ai_summary, created_at
         FROM tickets ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch one ticket by id.
///
/// # Errors
///
/// Returns [`TicketError::Database`] if the query fails.
pub async fn find_ticket(pool: &PgPool, id: Uuid) -> Result<Option<TicketRow>, TicketError> {
    let row = sqlx::query_as::<_, TicketRow>(
        "SELECT id, title, description, category, tags, image, ai_summary, created_at
         FROM tickets WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create a ticket: generate its AI summary, persist, return the stored row.
///
/// # Errors
///
/// Returns [`TicketError::Database`] if the insert fails. AI exhaustion is
/// not an error — the row is stored with the failure-marker summary.
pub async fn create_ticket(state: &AppState, ticket: NewTicket) -> Result<TicketRow, TicketError> {
    info!(title = %ticket.title, "creating ticket");

    let instruction = PromptComposer::summary(&ticket.title, &ticket.description);
    let summary = state.ai.generate(&instruction, None).await.trim().to_string();

    let row = sqlx::query_as::<_, TicketRow>(
        "INSERT INTO tickets (title, description, category, tags, image, ai_summary)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, title, description, category, tags, image, ai_summary, created_at",
    )
    .bind(&ticket.title)
    .bind(&ticket.description)
    .bind(&ticket.category)
    .bind(&ticket.tags)
    .bind(&ticket.image)
    .bind(&summary)
    .fetch_one(&state.pool)
    .await?;

    info!(id = %row.id, "ticket created");
    Ok(row)
}

#[cfg(test)]
#[path = "ticket_test.rs"]
mod tests;
