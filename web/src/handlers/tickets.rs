//! Ticket endpoints.
//!
//! - GET /api/v1/tickets/:id - Get a ticket
//! - POST /api/v1/tickets/:id/cancel - Cancel a ticket and release its seats
//! - POST /api/v1/tickets/:id/redeem - Mark a ticket used at the gate
//! - GET /api/v1/tickets?email=... - A client's tickets
//! - GET /api/v1/tickets?qr=... - The ticket behind a scanned QR token

use crate::error::AppError;
use crate::WebResult;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use darshan_core::{QrToken, Ticket, TicketId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Ticket as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketView {
    /// The stored ticket
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Label of the assigned slot, e.g. `09:30 AM`
    pub slot_label: String,
    /// Numeric priority tier
    pub priority_tier: u8,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        Self {
            slot_label: ticket.slot_label(),
            priority_tier: ticket.priority.tier(),
            ticket,
        }
    }
}

/// Query parameters for ticket search.
#[derive(Debug, Deserialize)]
pub struct TicketQuery {
    /// Client email
    pub email: Option<String>,
    /// Scanned QR token
    pub qr: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get a ticket by id.
///
/// ```bash
/// curl http://localhost:8080/api/v1/tickets/550e8400-e29b-41d4-a716-446655440000
/// ```
///
/// # Errors
///
/// 400 for malformed ids, 404 for unknown tickets.
#[allow(clippy::unused_async)]
pub async fn get_ticket(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> WebResult<Json<TicketView>> {
    let ticket = state.engine.ticket(parse_ticket_id(&id)?)?;
    Ok(Json(ticket.into()))
}

/// Cancel a ticket and return its seats to the slot.
///
/// # Errors
///
/// 404 for unknown tickets, 409 if already cancelled, expired or used.
#[allow(clippy::unused_async)]
pub async fn cancel_ticket(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> WebResult<Json<TicketView>> {
    let ticket = state.engine.cancel(parse_ticket_id(&id)?)?;
    Ok(Json(ticket.into()))
}

/// Mark a ticket as used when its QR code is scanned at the gate.
///
/// # Errors
///
/// 404 for unknown tickets, 409 if already cancelled, expired or used.
#[allow(clippy::unused_async)]
pub async fn redeem_ticket(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> WebResult<Json<TicketView>> {
    let ticket = state.engine.redeem(parse_ticket_id(&id)?)?;
    Ok(Json(ticket.into()))
}

/// Search tickets by client email or QR token.
///
/// ```bash
/// curl "http://localhost:8080/api/v1/tickets?email=asha@example.com"
/// ```
///
/// # Errors
///
/// 400 unless exactly one of `email` or `qr` is given.
#[allow(clippy::unused_async)]
pub async fn search_tickets(
    State(state): State<AppState>,
    query: Result<Query<TicketQuery>, QueryRejection>,
) -> Result<Json<Vec<TicketView>>, AppError> {
    let Query(query) = query?;

    let tickets = match (query.email, query.qr) {
        (Some(email), None) => state.engine.tickets_for_email(&email),
        (None, Some(qr)) => state
            .engine
            .ticket_by_qr(&QrToken::new(qr))
            .into_iter()
            .collect(),
        _ => {
            return Err(AppError::bad_request(
                "exactly one of 'email' or 'qr' is required",
            ));
        }
    };

    Ok(Json(tickets.into_iter().map(TicketView::from).collect()))
}

fn parse_ticket_id(raw: &str) -> Result<TicketId, AppError> {
    Uuid::parse_str(raw)
        .map(TicketId::from_uuid)
        .map_err(|_| AppError::bad_request(format!("'{raw}' is not a valid ticket id")))
}
