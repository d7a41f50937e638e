//! Slot availability endpoint.
//!
//! - GET /api/v1/slots/:date - Availability of every slot on a date

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use darshan_core::{BookingError, InvalidField, SlotAvailability};
use serde::{Deserialize, Serialize};

// ============================================================================
// Response Types
// ============================================================================

/// Availability of a whole day.
#[derive(Debug, Serialize, Deserialize)]
pub struct DayAvailabilityResponse {
    /// Requested date
    pub date: NaiveDate,
    /// One line per slot, in slot order
    pub slots: Vec<SlotAvailability>,
    /// Seats left across the day
    pub total_available: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get availability for every slot on a date.
///
/// Never blocks on bookings in flight.
///
/// ```bash
/// curl http://localhost:8080/api/v1/slots/2026-01-02
/// ```
///
/// Response:
/// ```json
/// {
///   "date": "2026-01-02",
///   "slots": [
///     {
///       "ordinal": 0,
///       "starts_at": "08:00:00",
///       "label": "08:00 AM",
///       "capacity": 100,
///       "booked": 95,
///       "available": 5,
///       "status": "filling",
///       "occupancy_percent": 95
///     }
///   ],
///   "total_available": 5
/// }
/// ```
///
/// # Errors
///
/// 422 for malformed, past or not yet bookable dates.
#[allow(clippy::unused_async)]
pub async fn get_day_availability(
    Path(date): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DayAvailabilityResponse>, AppError> {
    let date = parse_date(&date)?;
    let slots = state.engine.list_availability(date)?;
    let total_available = slots.iter().map(|slot| u64::from(slot.available)).sum();

    Ok(Json(DayAvailabilityResponse {
        date,
        slots,
        total_available,
    }))
}

/// Parses an ISO `YYYY-MM-DD` date from a path segment.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| {
        AppError::from(BookingError::invalid(
            InvalidField::Date,
            format!("'{raw}' is not a YYYY-MM-DD date: {err}"),
        ))
    })
}
