//! Error types for the booking engine.
//!
//! - [`CapacityError`]: guards on the slot capacity table. Outside the table
//!   they signal a concurrency bug and are logged as faults.
//! - [`TicketError`]: ticket store lookups and status transitions.
//! - [`BookingError`]: everything a caller of the engine can see.
//! - [`ConfigError`]: rejected engine configuration.

use crate::types::{SlotOrdinal, TicketId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Errors from the slot capacity table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapacityError {
    /// The date already has materialized slots
    #[error("slots for {date} are already initialized")]
    AlreadyInitialized {
        /// Date that was initialized twice
        date: NaiveDate,
    },

    /// No such slot (or the date was never initialized)
    #[error("slot {ordinal} on {date} not found")]
    SlotNotFound {
        /// Requested date
        date: NaiveDate,
        /// Requested slot
        ordinal: SlotOrdinal,
    },

    /// Reservation would push the slot past its maximum
    #[error("reserving {requested} seats in slot {ordinal} on {date} exceeds capacity ({available} available)")]
    CapacityExceeded {
        /// Date of the slot
        date: NaiveDate,
        /// Slot being reserved
        ordinal: SlotOrdinal,
        /// Seats requested
        requested: u32,
        /// Seats that were left
        available: u32,
    },

    /// Release would drive the booked count negative
    #[error("releasing {requested} seats from slot {ordinal} on {date} would underflow ({booked} booked)")]
    Underflow {
        /// Date of the slot
        date: NaiveDate,
        /// Slot being released
        ordinal: SlotOrdinal,
        /// Seats to release
        requested: u32,
        /// Seats currently booked
        booked: u32,
    },
}

/// Errors from the ticket store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// A ticket with this id was already stored
    #[error("ticket {0} already exists")]
    DuplicateTicketId(TicketId),

    /// No ticket with this id
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// Ticket was cancelled earlier
    #[error("ticket {0} is already cancelled")]
    AlreadyCancelled(TicketId),

    /// Ticket's validity window has elapsed
    #[error("ticket {0} has expired")]
    AlreadyExpired(TicketId),

    /// Ticket was redeemed at the gate
    #[error("ticket {0} has already been used")]
    AlreadyUsed(TicketId),
}

/// Request field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidField {
    /// Visit date
    Date,
    /// Preferred slot
    Slot,
    /// Seat count
    Seats,
    /// Client name
    Name,
    /// Client email
    Email,
    /// Client phone
    Phone,
}

impl InvalidField {
    /// Wire name of the field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Slot => "slot",
            Self::Seats => "seats",
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the booking engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The request is malformed; the caller can fix it and retry
    #[error("invalid {field}: {reason}")]
    InvalidRequest {
        /// Offending field
        field: InvalidField,
        /// What is wrong with it
        reason: String,
    },

    /// The date lies beyond the booking horizon
    #[error("{date} is not schedulable (bookings open {horizon_days} days ahead)")]
    DateNotSchedulable {
        /// Requested date
        date: NaiveDate,
        /// Configured horizon
        horizon_days: u32,
    },

    /// No slot at or after the preferred one has enough seats
    #[error("no slot from {from} onwards on {date} has {seats} seats left")]
    SlotsFull {
        /// Requested date
        date: NaiveDate,
        /// Preferred slot where the search started
        from: SlotOrdinal,
        /// Seats requested
        seats: u32,
    },

    /// Ticket lookup or status transition failed
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// A capacity guard tripped inside the engine
    #[error("capacity invariant violated: {0}")]
    Capacity(#[from] CapacityError),
}

impl BookingError {
    /// Builds an `InvalidRequest` for `field`
    #[must_use]
    pub fn invalid(field: InvalidField, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error indicates a broken invariant rather than a normal
    /// business outcome. Operators must be alerted on these.
    #[must_use]
    pub const fn is_invariant_fault(&self) -> bool {
        matches!(
            self,
            Self::Capacity(_) | Self::Ticket(TicketError::DuplicateTicketId(_))
        )
    }
}

/// Rejected engine configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Schedule has no slots
    #[error("schedule must contain at least one slot")]
    EmptySchedule,

    /// Slots would all start at the same time
    #[error("slot interval must be greater than zero")]
    ZeroInterval,

    /// Slots would have no seats
    #[error("slot capacity must be greater than zero")]
    ZeroCapacity,

    /// Bookings could never be made
    #[error("maximum seats per booking must be greater than zero")]
    ZeroMaxSeats,

    /// Tickets would expire on issue
    #[error("validity window must be greater than zero")]
    ZeroValidityWindow,

    /// Tickets would stay honorable for longer than the site allows
    #[error("validity window of {hours} hours exceeds the maximum of {max}")]
    ValidityWindowTooLong {
        /// Configured window
        hours: u32,
        /// Largest accepted window
        max: u32,
    },

    /// Bookings would open further ahead than one calendar year
    #[error("booking horizon of {days} days exceeds the maximum of {max}")]
    HorizonTooFar {
        /// Configured horizon
        days: u32,
        /// Largest accepted horizon
        max: u32,
    },

    /// Offset outside what a time zone can be
    #[error("UTC offset of {minutes} minutes is out of range")]
    InvalidUtcOffset {
        /// Configured offset
        minutes: i32,
    },

    /// Later slots would start on the next day
    #[error("slot {ordinal} would start after midnight")]
    ScheduleCrossesMidnight {
        /// First slot past midnight
        ordinal: SlotOrdinal,
    },
}
