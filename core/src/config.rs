//! Engine configuration.
//!
//! Defaults reproduce the temple's published schedule: 25 half-hour slots from
//! 08:00 AM to 08:00 PM, 100 seats each, bookable up to 30 days ahead.

use crate::error::ConfigError;
use crate::types::{Capacity, SlotOrdinal, slot_label};
use chrono::{Duration, FixedOffset, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// One slot of the daily schedule, before any bookings exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Local start time of the slot
    pub starts_at: NaiveTime,
    /// Seats available in the slot
    pub capacity: Capacity,
}

impl SlotDefinition {
    /// Creates a new `SlotDefinition`
    #[must_use]
    pub const fn new(starts_at: NaiveTime, capacity: Capacity) -> Self {
        Self { starts_at, capacity }
    }

    /// Label such as `08:00 AM`
    #[must_use]
    pub fn label(&self) -> String {
        slot_label(self.starts_at)
    }
}

/// Shape of the daily schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Start time of the first slot
    pub first_slot: NaiveTime,
    /// Minutes between consecutive slot starts
    pub interval_minutes: u32,
    /// Number of slots per day
    pub slot_count: u16,
    /// Seats per slot
    pub capacity_per_slot: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            first_slot: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            interval_minutes: 30,
            slot_count: 25,
            capacity_per_slot: 100,
        }
    }
}

impl ScheduleConfig {
    /// Expands the schedule into one definition per slot, in ordinal order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the schedule is empty, has a zero interval
    /// or capacity, or runs past midnight.
    pub fn slot_definitions(&self) -> Result<Vec<SlotDefinition>, ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::EmptySchedule);
        }
        if self.interval_minutes == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.capacity_per_slot == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let capacity = Capacity::new(self.capacity_per_slot);
        (0..self.slot_count)
            .map(|ordinal| {
                let offset = Duration::minutes(i64::from(self.interval_minutes) * i64::from(ordinal));
                let (starts_at, wrapped) = self.first_slot.overflowing_add_signed(offset);
                if wrapped != 0 {
                    return Err(ConfigError::ScheduleCrossesMidnight {
                        ordinal: SlotOrdinal::new(ordinal),
                    });
                }
                Ok(SlotDefinition::new(starts_at, capacity))
            })
            .collect()
    }
}

/// Longest accepted validity window: one week
pub const MAX_VALIDITY_WINDOW_HOURS: u32 = 7 * 24;

/// Furthest accepted booking horizon
pub const MAX_BOOKING_HORIZON_DAYS: u32 = 366;

/// Booking rules enforced by the allocator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Largest party a single booking may cover
    pub max_seats_per_booking: u32,
    /// A slot with this many seats or fewer left is reported as `Filling`
    pub filling_threshold: u32,
    /// Hours after issuance before an unused ticket expires
    pub validity_window_hours: u32,
    /// How many days past today a date may be booked
    pub booking_horizon_days: u32,
    /// Offset of the temple's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Daily slot layout
    pub schedule: ScheduleConfig,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_seats_per_booking: 10,
            filling_threshold: 10,
            validity_window_hours: 24,
            booking_horizon_days: 30,
            // Indian Standard Time
            utc_offset_minutes: 330,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl BookingConfig {
    /// Validity window as a duration
    #[must_use]
    pub fn validity_window(&self) -> TimeDelta {
        Duration::hours(i64::from(self.validity_window_hours))
    }

    /// The site's local offset, used to decide what "today" is
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUtcOffset`] if the offset is not within ±24h.
    pub fn site_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset {
                minutes: self.utc_offset_minutes,
            })
    }

    /// Checks every setting and expands the schedule.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<Vec<SlotDefinition>, ConfigError> {
        if self.max_seats_per_booking == 0 {
            return Err(ConfigError::ZeroMaxSeats);
        }
        if self.validity_window_hours == 0 {
            return Err(ConfigError::ZeroValidityWindow);
        }
        if self.validity_window_hours > MAX_VALIDITY_WINDOW_HOURS {
            return Err(ConfigError::ValidityWindowTooLong {
                hours: self.validity_window_hours,
                max: MAX_VALIDITY_WINDOW_HOURS,
            });
        }
        if self.booking_horizon_days > MAX_BOOKING_HORIZON_DAYS {
            return Err(ConfigError::HorizonTooFar {
                days: self.booking_horizon_days,
                max: MAX_BOOKING_HORIZON_DAYS,
            });
        }
        self.site_offset()?;
        self.schedule.slot_definitions()
    }
}
