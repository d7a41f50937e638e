//! # Darshan Testing
//!
//! Testing utilities for the darshan booking engine.
//!
//! This crate provides:
//! - Controllable [`Clock`] implementations
//! - Fixtures for configs, requests and engines
//! - A Given-When-Then [`BookingScenario`] builder
//! - proptest strategies for booking inputs
//!
//! ## Example
//!
//! ```
//! use darshan_testing::{fixtures, test_clock};
//! use darshan_core::SlotOrdinal;
//! use std::sync::Arc;
//!
//! let engine = fixtures::engine(fixtures::small_config(100, 3), Arc::new(test_clock()));
//! let booking = engine
//!     .book(fixtures::request(fixtures::visit_date(), 0, 2))
//!     .unwrap_or_else(|err| panic!("booking failed: {err}"));
//!
//! assert_eq!(booking.assigned_slot(), SlotOrdinal::new(0));
//! ```

use chrono::{DateTime, Utc};
use darshan_core::environment::Clock;

mod scenario;

pub use scenario::BookingScenario;

/// Mock implementations of the engine's injected dependencies
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::TimeDelta;
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use darshan_testing::mocks::FixedClock;
    /// use darshan_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to.
    ///
    /// Share it through an `Arc` with the engine and advance it from the test
    /// to push tickets past their validity window.
    ///
    /// ```
    /// use darshan_testing::mocks::MockClock;
    /// use darshan_core::environment::Clock;
    /// use chrono::{TimeDelta, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = MockClock::new(start);
    /// clock.advance(TimeDelta::hours(25));
    /// assert_eq!(clock.now(), start + TimeDelta::hours(25));
    /// ```
    #[derive(Debug)]
    pub struct MockClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl MockClock {
        /// Create a mock clock starting at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward (or back, for negative deltas)
        pub fn advance(&self, by: TimeDelta) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Start of every test timeline: 2026-01-01 06:00 UTC, 11:30 at the temple
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T06:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// Create a default fixed clock for tests, set to [`test_time`]
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }

    /// Create a mock clock for tests, starting at [`test_time`]
    #[must_use]
    pub fn mock_clock() -> MockClock {
        MockClock::new(test_time())
    }
}

/// Ready-made configs, requests and engines
pub mod fixtures {
    use chrono::{Days, NaiveDate, NaiveTime};
    use darshan_core::environment::Clock;
    use darshan_core::{
        BookingConfig, BookingEngine, BookingRequest, ClientInfo, ScheduleConfig, SlotOrdinal,
    };
    use std::sync::Arc;

    /// Temple date of [`crate::mocks::test_time`]
    #[must_use]
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default()
    }

    /// Date most tests book for: the day after [`today`]
    #[must_use]
    pub fn visit_date() -> NaiveDate {
        today().checked_add_days(Days::new(1)).unwrap_or_default()
    }

    /// Default rules with a custom schedule of `slot_count` half-hour slots
    /// from 08:00, each holding `capacity` seats
    #[must_use]
    pub fn small_config(capacity: u32, slot_count: u16) -> BookingConfig {
        BookingConfig {
            schedule: ScheduleConfig {
                first_slot: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
                interval_minutes: 30,
                slot_count,
                capacity_per_slot: capacity,
            },
            ..BookingConfig::default()
        }
    }

    /// Builds an engine, panicking on an invalid config
    ///
    /// # Panics
    ///
    /// Panics if `config` is rejected.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn engine(config: BookingConfig, clock: Arc<dyn Clock>) -> BookingEngine {
        BookingEngine::new(config, clock).unwrap_or_else(|err| panic!("invalid test config: {err}"))
    }

    /// A plausible client, distinguished by `n`
    #[must_use]
    pub fn client(n: usize) -> ClientInfo {
        ClientInfo::new(
            format!("Devotee {n}"),
            format!("devotee{n}@example.com"),
            Some(format!("+91 98765 {n:05}")),
        )
    }

    /// A valid request for `seats` seats at `slot` on `date`
    #[must_use]
    pub fn request(date: NaiveDate, slot: u16, seats: u32) -> BookingRequest {
        request_for(date, slot, seats, client(0))
    }

    /// Same as [`request`] for a specific client
    #[must_use]
    pub fn request_for(date: NaiveDate, slot: u16, seats: u32, client: ClientInfo) -> BookingRequest {
        BookingRequest {
            date,
            slot: SlotOrdinal::new(slot),
            seats,
            client,
        }
    }
}

/// Property-based testing utilities using proptest
pub mod properties {
    use proptest::prelude::*;

    /// A party size within the default per-booking limit
    pub fn seats() -> impl Strategy<Value = u32> {
        1u32..=10
    }

    /// A sequence of `(preferred slot, seats)` booking attempts for a day of
    /// `slot_count` slots
    pub fn booking_attempts(slot_count: u16, max_len: usize) -> impl Strategy<Value = Vec<(u16, u32)>> {
        proptest::collection::vec((0..slot_count, seats()), 1..=max_len)
    }
}

/// Routes `tracing` output through the test harness's captured writer.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("darshan_core=debug"))
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockClock, mock_clock, test_clock, test_time};
