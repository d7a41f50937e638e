//! Booking endpoint.
//!
//! - POST /api/v1/bookings - Book seats at a preferred slot

use crate::error::AppError;
use crate::extractors::CorrelationId;
use crate::handlers::slots::parse_date;
use crate::handlers::tickets::TicketView;
use crate::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use darshan_core::{BookingRequest, ClientInfo, SlotOrdinal};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    /// Visit date (`YYYY-MM-DD`)
    pub date: String,
    /// Preferred slot ordinal (0 is the first slot of the day)
    pub slot: u16,
    /// Number of seats
    pub seats: u32,
    /// Client name
    pub name: String,
    /// Client email
    pub email: String,
    /// Client phone
    #[serde(default)]
    pub phone: Option<String>,
}

impl TryFrom<CreateBookingRequest> for BookingRequest {
    type Error = AppError;

    fn try_from(body: CreateBookingRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            date: parse_date(&body.date)?,
            slot: SlotOrdinal::new(body.slot),
            seats: body.seats,
            client: ClientInfo::new(body.name, body.email, body.phone),
        })
    }
}

/// Response for a confirmed booking.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    /// Slot the client asked for
    pub requested_slot: SlotOrdinal,
    /// Slot that was reserved
    pub assigned_slot: SlotOrdinal,
    /// Whether the booking was moved to a later slot
    pub reassigned: bool,
    /// The issued ticket
    pub ticket: TicketView,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book seats at the preferred slot, or the nearest later slot with room.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/bookings \
///   -H "Content-Type: application/json" \
///   -d '{"date":"2026-01-02","slot":4,"seats":3,"name":"Asha Verma","email":"asha@example.com"}'
/// ```
///
/// # Errors
///
/// - 400 for unparseable bodies
/// - 422 for invalid requests (malformed dates included) and dates outside
///   the booking horizon
/// - 409 when no slot from the preferred one on has room
#[allow(clippy::unused_async)]
pub async fn create_booking(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let Json(body) = payload?;
    tracing::debug!(%correlation_id, date = %body.date, slot = body.slot, seats = body.seats, "Booking requested");

    let booking = state.engine.book(BookingRequest::try_from(body)?)?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            requested_slot: booking.requested_slot(),
            assigned_slot: booking.assigned_slot(),
            reassigned: booking.was_reassigned(),
            ticket: TicketView::from(booking.ticket),
        }),
    ))
}
