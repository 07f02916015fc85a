//! GSTSAAS job cards and support tickets.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eka_core::records::TicketMetrics;
use eka_core::{JobCard, JobCardRequest, Ticket, TicketRequest};
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_job_card(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<JobCardRequest>,
) -> Result<(StatusCode, Json<JobCard>), ApiError> {
    let card = state.records.create_job_card(&user.id, body).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn list_job_cards(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<JobCard>>, ApiError> {
    Ok(Json(state.records.job_cards_for(&user.id).await?))
}

/// Creates the ticket and pushes a `notification` to the caller's live connections.
pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<TicketRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state.records.create_ticket(&user.id, body).await?;
    let delivered = state.notifier.emit_notification(
        &user.id,
        json!({
            "type": "ticket_created",
            "title": format!("Ticket {} opened", ticket.ticket_number),
            "message": ticket.subject,
            "ticket_id": ticket.id,
            "priority": ticket.priority,
            "sla_hours": ticket.sla_hours,
        }),
    );
    tracing::debug!(ticket_number = %ticket.ticket_number, delivered, "ticket notification sent");
    Ok(Json(ticket))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.records.tickets_for(&user.id).await?))
}

pub async fn support_metrics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TicketMetrics>, ApiError> {
    Ok(Json(state.records.ticket_metrics(&user.id).await?))
}
