//! # Darshan Core
//!
//! Slot booking engine for temple darshan visits.
//!
//! A day is split into ordered time slots, each with a fixed number of seats.
//! Devotees ask for `N` seats at a preferred slot; the engine finds the first
//! slot at or after the preferred one that still has room, reserves the seats
//! atomically and issues a ticket carrying an opaque QR token.
//!
//! ## Components
//!
//! - [`capacity::SlotCapacityTable`]: per-date slots and their booked counts
//! - [`availability`]: available seats and `Available` / `Filling` / `Full` status
//! - [`overflow`]: forward-only search for a slot with enough room
//! - [`allocator::BookingEngine`]: validation, search + reserve, ticket issuance
//! - [`tickets::TicketStore`]: issued tickets and their status transitions
//!
//! ## Concurrency
//!
//! ```text
//! book(date D) ──► lock(D) ─► snapshot ─► overflow search ─► reserve ─► unlock(D)
//!                                                                 │
//! list_availability(D) ──► atomic per-slot reads (never blocks) ◄─┘
//! ```
//!
//! Every date has its own exclusive lock held across search and reservation,
//! so bookings on different dates never contend. Each slot's booked counter is
//! an atomic, so readers see a consistent value without taking the lock.
//!
//! ## Example
//!
//! ```
//! use chrono::Days;
//! use darshan_core::{
//!     BookingConfig, BookingEngine, BookingRequest, ClientInfo, SlotOrdinal,
//!     environment::SystemClock,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BookingEngine::new(BookingConfig::default(), Arc::new(SystemClock))?;
//! let date = engine.today().checked_add_days(Days::new(1)).ok_or("date overflow")?;
//!
//! let booking = engine.book(BookingRequest {
//!     date,
//!     slot: SlotOrdinal::new(2),
//!     seats: 3,
//!     client: ClientInfo::new("Asha Verma", "asha@example.com", None),
//! })?;
//!
//! assert_eq!(booking.assigned_slot(), SlotOrdinal::new(2));
//! assert!(!booking.was_reassigned());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod allocator;
pub mod availability;
pub mod capacity;
pub mod config;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod overflow;
pub mod tickets;
pub mod types;

pub use allocator::BookingEngine;
pub use availability::{SlotAvailability, SlotStatus};
pub use capacity::{SlotCapacityTable, TimeSlot};
pub use config::{BookingConfig, ScheduleConfig, SlotDefinition};
pub use error::{BookingError, CapacityError, ConfigError, InvalidField, TicketError};
pub use tickets::TicketStore;
pub use types::*;
