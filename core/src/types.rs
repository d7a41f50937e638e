//! Domain types for darshan slot booking.
//!
//! Identifiers, value objects, the ephemeral [`BookingRequest`] and the durable
//! [`Ticket`] it produces.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an issued ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token printed as the ticket's QR code.
///
/// Bound 1:1 to a ticket. Generated from 128 random bits, rendered as
/// `QR-` followed by 32 upper-case hex digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QrToken(String);

impl QrToken {
    /// Generates a fresh random token
    #[must_use]
    pub fn generate() -> Self {
        let bits: u128 = rand::thread_rng().r#gen();
        Self(format!("QR-{bits:032X}"))
    }

    /// Wraps an existing token (e.g. one scanned at the gate)
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QrToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Slots and Capacity
// ============================================================================

/// Position of a slot within a day's schedule.
///
/// Ordinals define the total order of slots on a date: ordinal 0 is the first
/// slot of the day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotOrdinal(u16);

impl SlotOrdinal {
    /// Creates a new `SlotOrdinal`
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the ordinal value
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the ordinal as an index into a day's slot list
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Maximum number of seats in a slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a new `Capacity`
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable slot label, e.g. `08:30 AM`
#[must_use]
pub fn slot_label(starts_at: NaiveTime) -> String {
    starts_at.format("%I:%M %p").to_string()
}

// ============================================================================
// Requests
// ============================================================================

/// Contact details of the devotee making a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Optional phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ClientInfo {
    /// Creates a new `ClientInfo`
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone,
        }
    }
}

/// A caller's intent to book seats. Consumed by the allocator, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Date of the visit
    pub date: NaiveDate,
    /// Preferred slot
    pub slot: SlotOrdinal,
    /// Number of seats wanted
    pub seats: u32,
    /// Who is booking
    pub client: ClientInfo,
}

// ============================================================================
// Tickets
// ============================================================================

/// Ticket lifecycle status
///
/// ```text
/// Booked ──► Used
///   │
///   ├──────► Expired   (validity window elapsed, capacity released)
///   └──────► Cancelled (capacity released)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Issued and honorable
    Booked,
    /// Redeemed at the gate
    Used,
    /// Validity window elapsed before use
    Expired,
    /// Cancelled by the client
    Cancelled,
}

impl TicketStatus {
    /// Whether a ticket in this status still counts against its slot's capacity
    #[must_use]
    pub const fn holds_capacity(self) -> bool {
        matches!(self, Self::Booked | Self::Used)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Booked => "booked",
            Self::Used => "used",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Priority class of a booking.
///
/// Large parties strain capacity more and may need manual handling, so they
/// get the lower tier. Purely a classification; nothing reorders on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Parties of up to five
    Normal,
    /// Parties larger than five
    Low,
}

impl Priority {
    /// Seat count above which a booking is classified as `Low`
    pub const LARGE_PARTY_THRESHOLD: u32 = 5;

    /// Classifies a booking by its seat count
    #[must_use]
    pub const fn for_seats(seats: u32) -> Self {
        if seats > Self::LARGE_PARTY_THRESHOLD {
            Self::Low
        } else {
            Self::Normal
        }
    }

    /// Numeric tier used by downstream review tooling (higher is more urgent)
    #[must_use]
    pub const fn tier(self) -> u8 {
        match self {
            Self::Normal => 4,
            Self::Low => 2,
        }
    }
}

/// Durable record of a successful booking.
///
/// Slot, date and seat count never change after issuance; only `status`
/// (and `status_changed_at`) move, and only inside the [`crate::TicketStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier
    pub id: TicketId,
    /// Snapshot of the client's contact details at booking time
    pub client: ClientInfo,
    /// Date of the visit
    pub date: NaiveDate,
    /// Slot actually assigned
    pub slot: SlotOrdinal,
    /// Start time of the assigned slot
    pub slot_starts_at: NaiveTime,
    /// Slot the client asked for
    pub requested_slot: SlotOrdinal,
    /// Number of seats held by this ticket
    pub seats: u32,
    /// QR token bound to this ticket
    pub qr_token: QrToken,
    /// When the ticket was issued
    pub issued_at: DateTime<Utc>,
    /// When an unused ticket stops being honorable
    pub expires_at: DateTime<Utc>,
    /// Current lifecycle status
    pub status: TicketStatus,
    /// When the status last changed (None while still `Booked`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_at: Option<DateTime<Utc>>,
    /// Priority class derived from the seat count
    pub priority: Priority,
}

impl Ticket {
    /// Whether an unused ticket has passed its expiry at `now`
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TicketStatus::Booked && now >= self.expires_at
    }

    /// Label of the assigned slot, e.g. `09:30 AM`
    #[must_use]
    pub fn slot_label(&self) -> String {
        slot_label(self.slot_starts_at)
    }
}

/// Result of a successful booking.
///
/// Carries both the requested and the assigned slot so callers can tell the
/// client when the request was moved to a later slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// The issued ticket
    pub ticket: Ticket,
}

impl Booking {
    /// Slot the client asked for
    #[must_use]
    pub const fn requested_slot(&self) -> SlotOrdinal {
        self.ticket.requested_slot
    }

    /// Slot that was actually reserved
    #[must_use]
    pub const fn assigned_slot(&self) -> SlotOrdinal {
        self.ticket.slot
    }

    /// Whether the booking landed on a later slot than requested
    #[must_use]
    pub fn was_reassigned(&self) -> bool {
        self.ticket.slot != self.ticket.requested_slot
    }
}
