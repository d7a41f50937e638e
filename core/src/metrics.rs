//! Business metrics for darshan bookings.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host process installs a recorder.
//!
//! # Exported Metrics
//!
//! - `darshan_bookings_total{outcome}` - Booking attempts by outcome
//!   (`confirmed`, `reassigned`, `slots_full`, `invalid`, `not_schedulable`, `fault`)
//! - `darshan_seats_reserved_total` - Seats reserved by confirmed bookings
//! - `darshan_seats_released_total{reason}` - Seats returned (`cancelled`, `expired`, `rollback`)
//! - `darshan_tickets_redeemed_total` - Tickets scanned at the gate
//! - `darshan_invariant_faults_total` - Capacity guards tripped inside the engine

use metrics::describe_counter;

/// Booking attempts by outcome
pub const BOOKINGS_TOTAL: &str = "darshan_bookings_total";
/// Seats reserved
pub const SEATS_RESERVED_TOTAL: &str = "darshan_seats_reserved_total";
/// Seats released
pub const SEATS_RELEASED_TOTAL: &str = "darshan_seats_released_total";
/// Tickets redeemed
pub const TICKETS_REDEEMED_TOTAL: &str = "darshan_tickets_redeemed_total";
/// Invariant faults
pub const INVARIANT_FAULTS_TOTAL: &str = "darshan_invariant_faults_total";

/// Why seats went back to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// Client cancelled
    Cancelled,
    /// Validity window elapsed
    Expired,
    /// Ticket could not be stored after the reservation
    Rollback,
}

impl ReleaseReason {
    /// Label value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Rollback => "rollback",
        }
    }
}

/// Registers descriptions for every booking metric.
///
/// Call once at startup, after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        BOOKINGS_TOTAL,
        "Booking attempts by outcome (confirmed, reassigned, slots_full, invalid, not_schedulable, fault)"
    );
    describe_counter!(SEATS_RESERVED_TOTAL, "Seats reserved by confirmed bookings");
    describe_counter!(
        SEATS_RELEASED_TOTAL,
        "Seats returned to their slot by reason (cancelled, expired, rollback)"
    );
    describe_counter!(TICKETS_REDEEMED_TOTAL, "Tickets redeemed at the gate");
    describe_counter!(
        INVARIANT_FAULTS_TOTAL,
        "Capacity invariant violations detected inside the engine"
    );

    tracing::info!("Booking metrics registered");
}

// ============================================================================
// Recording
// ============================================================================

pub(crate) fn record_booking(outcome: &'static str) {
    metrics::counter!(BOOKINGS_TOTAL, "outcome" => outcome).increment(1);
}

pub(crate) fn record_seats_reserved(seats: u32) {
    metrics::counter!(SEATS_RESERVED_TOTAL).increment(u64::from(seats));
}

pub(crate) fn record_seats_released(seats: u32, reason: ReleaseReason) {
    metrics::counter!(SEATS_RELEASED_TOTAL, "reason" => reason.as_str()).increment(u64::from(seats));
}

pub(crate) fn record_redeemed() {
    metrics::counter!(TICKETS_REDEEMED_TOTAL).increment(1);
}

pub(crate) fn record_invariant_fault() {
    metrics::counter!(INVARIANT_FAULTS_TOTAL).increment(1);
}
