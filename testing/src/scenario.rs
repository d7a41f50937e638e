//! Given-When-Then scenarios for the booking engine

#![allow(clippy::module_name_repetitions)]

use crate::fixtures;
use crate::mocks::mock_clock;
use darshan_core::{
    Booking, BookingConfig, BookingEngine, BookingError, BookingRequest, SlotOrdinal,
};
use std::sync::Arc;

type OutcomeAssertion = Box<dyn FnOnce(&Result<Booking, BookingError>)>;
type EngineAssertion = Box<dyn FnOnce(&BookingEngine)>;

/// Fluent API for booking tests with Given-When-Then syntax
///
/// Every booking targets [`fixtures::visit_date`].
///
/// # Example
///
/// ```
/// use darshan_testing::{BookingScenario, fixtures};
///
/// BookingScenario::new(fixtures::small_config(100, 3))
///     .given_booked(0, 95)
///     .when_booking(0, 10)
///     .then_assigned(1)
///     .then_booked(0, 95)
///     .then_booked(1, 10)
///     .run();
/// ```
pub struct BookingScenario {
    config: BookingConfig,
    given: Vec<(u16, u32)>,
    request: Option<BookingRequest>,
    outcome_assertions: Vec<OutcomeAssertion>,
    engine_assertions: Vec<EngineAssertion>,
}

impl BookingScenario {
    /// Create a new scenario over an engine built from `config`
    #[must_use]
    pub fn new(config: BookingConfig) -> Self {
        Self {
            config,
            given: Vec::new(),
            request: None,
            outcome_assertions: Vec::new(),
            engine_assertions: Vec::new(),
        }
    }

    /// Pre-book `seats` seats in `slot` (Given).
    ///
    /// Split into bookings no larger than the per-booking maximum; each must
    /// land in `slot` itself.
    #[must_use]
    pub fn given_booked(mut self, slot: u16, seats: u32) -> Self {
        self.given.push((slot, seats));
        self
    }

    /// Book `seats` seats preferring `slot` (When)
    #[must_use]
    pub fn when_booking(self, slot: u16, seats: u32) -> Self {
        self.when_request(fixtures::request(fixtures::visit_date(), slot, seats))
    }

    /// Submit an arbitrary request (When)
    #[must_use]
    pub fn when_request(mut self, request: BookingRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Expect the booking to succeed in `slot` (Then)
    #[must_use]
    #[allow(clippy::panic)]
    pub fn then_assigned(mut self, slot: u16) -> Self {
        self.outcome_assertions.push(Box::new(move |outcome| match outcome {
            Ok(booking) => assert_eq!(booking.assigned_slot(), SlotOrdinal::new(slot)),
            Err(err) => panic!("expected a booking in slot {slot}, got error: {err}"),
        }));
        self
    }

    /// Add an assertion about the booking result (Then)
    #[must_use]
    pub fn then_outcome<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&Result<Booking, BookingError>) + 'static,
    {
        self.outcome_assertions.push(Box::new(assertion));
        self
    }

    /// Expect `slot` to hold exactly `seats` booked seats afterwards (Then)
    #[must_use]
    pub fn then_booked(mut self, slot: u16, seats: u32) -> Self {
        self.engine_assertions.push(Box::new(move |engine| {
            let booked = engine
                .slot(fixtures::visit_date(), SlotOrdinal::new(slot))
                .map_or(0, |s| s.booked);
            assert_eq!(booked, seats, "booked seats in slot {slot}");
        }));
        self
    }

    /// Add an assertion about the engine's final state (Then)
    #[must_use]
    pub fn then_engine<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&BookingEngine) + 'static,
    {
        self.engine_assertions.push(Box::new(assertion));
        self
    }

    /// Run the scenario and execute all assertions, returning the engine
    ///
    /// # Panics
    ///
    /// Panics if no request was set, if a Given booking fails or lands
    /// elsewhere, or if any assertion fails.
    #[allow(clippy::panic)]
    #[allow(clippy::expect_used)]
    pub fn run(self) -> BookingEngine {
        let engine = fixtures::engine(self.config, Arc::new(mock_clock()));
        let chunk = engine.config().max_seats_per_booking;

        for (slot, mut remaining) in self.given {
            while remaining > 0 {
                let seats = remaining.min(chunk);
                let booking = engine
                    .book(fixtures::request(fixtures::visit_date(), slot, seats))
                    .unwrap_or_else(|err| panic!("given booking in slot {slot} failed: {err}"));
                assert_eq!(
                    booking.assigned_slot(),
                    SlotOrdinal::new(slot),
                    "given booking overflowed out of slot {slot}"
                );
                remaining -= seats;
            }
        }

        let request = self.request.expect("Request must be set with when_booking()");
        let outcome = engine.book(request);

        for assertion in self.outcome_assertions {
            assertion(&outcome);
        }
        for assertion in self.engine_assertions {
            assertion(&engine);
        }

        engine
    }
}
