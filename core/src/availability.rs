//! Read-only availability derived from the capacity table.
//!
//! Nothing here mutates state; any number of readers may call these functions
//! concurrently with bookings in flight.

use crate::capacity::{SlotCapacityTable, TimeSlot};
use crate::error::CapacityError;
use crate::types::{Capacity, SlotOrdinal};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Occupancy classification of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Comfortably open
    Available,
    /// Only a handful of seats left
    Filling,
    /// No seats left
    Full,
}

impl SlotStatus {
    /// Classifies a slot by the seats it has left
    #[must_use]
    pub const fn classify(available: u32, filling_threshold: u32) -> Self {
        if available == 0 {
            Self::Full
        } else if available <= filling_threshold {
            Self::Filling
        } else {
            Self::Available
        }
    }
}

/// Availability line for one slot, as shown on the occupancy dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    /// Position within the day
    pub ordinal: SlotOrdinal,
    /// Local start time
    pub starts_at: NaiveTime,
    /// Label such as `10:00 AM`
    pub label: String,
    /// Maximum seats
    pub capacity: Capacity,
    /// Seats booked
    pub booked: u32,
    /// Seats left
    pub available: u32,
    /// Classification of `available`
    pub status: SlotStatus,
    /// Booked share of capacity, 0-100
    pub occupancy_percent: u8,
}

impl SlotAvailability {
    /// Builds the availability line for a slot snapshot
    #[must_use]
    pub fn from_slot(slot: &TimeSlot, filling_threshold: u32) -> Self {
        let available = slot.available();
        Self {
            ordinal: slot.ordinal,
            starts_at: slot.starts_at,
            label: slot.label(),
            capacity: slot.capacity,
            booked: slot.booked,
            available,
            status: SlotStatus::classify(available, filling_threshold),
            occupancy_percent: occupancy_percent(slot),
        }
    }
}

/// Booked share of a slot's capacity, rounded down. An empty-capacity slot
/// counts as fully occupied.
#[must_use]
pub fn occupancy_percent(slot: &TimeSlot) -> u8 {
    let capacity = u64::from(slot.capacity.value());
    if capacity == 0 {
        return 100;
    }
    let percent = u64::from(slot.booked.min(slot.capacity.value())) * 100 / capacity;
    u8::try_from(percent).unwrap_or(100)
}

/// Availability lines for a whole day, in slot order
#[must_use]
pub fn summarize(slots: &[TimeSlot], filling_threshold: u32) -> Vec<SlotAvailability> {
    slots
        .iter()
        .map(|slot| SlotAvailability::from_slot(slot, filling_threshold))
        .collect()
}

/// Seats left in a slot (`capacity - booked`).
///
/// # Errors
///
/// Returns [`CapacityError::SlotNotFound`] for unknown slots.
pub fn available(
    table: &SlotCapacityTable,
    date: NaiveDate,
    ordinal: SlotOrdinal,
) -> Result<u32, CapacityError> {
    table.get_slot(date, ordinal).map(|slot| slot.available())
}

/// Status of a slot.
///
/// # Errors
///
/// Returns [`CapacityError::SlotNotFound`] for unknown slots.
pub fn status(
    table: &SlotCapacityTable,
    date: NaiveDate,
    ordinal: SlotOrdinal,
    filling_threshold: u32,
) -> Result<SlotStatus, CapacityError> {
    available(table, date, ordinal).map(|left| SlotStatus::classify(left, filling_threshold))
}
