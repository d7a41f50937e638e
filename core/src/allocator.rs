//! Booking allocator.
//!
//! [`BookingEngine`] is the only component that mutates the slot capacity
//! table. A booking runs as:
//!
//! 1. validate the request against the site's calendar and booking rules
//! 2. materialize the date's slots on first use
//! 3. under the date's writer lock: snapshot, overflow search, reserve
//! 4. issue and store the ticket, releasing the seats again if that fails
//!
//! Cancellation and expiry go the other way: the ticket store moves the ticket
//! out of `Booked` (which can happen at most once), then the engine returns the
//! seats to the slot.

use crate::availability::{self, SlotAvailability};
use crate::capacity::{SlotCapacityTable, TimeSlot};
use crate::config::{BookingConfig, SlotDefinition};
use crate::environment::Clock;
use crate::error::{BookingError, CapacityError, ConfigError, InvalidField};
use crate::metrics::{self as booking_metrics, ReleaseReason};
use crate::overflow;
use crate::tickets::TicketStore;
use crate::types::{
    Booking, BookingRequest, ClientInfo, Priority, QrToken, SlotOrdinal, Ticket, TicketId,
    TicketStatus,
};
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;

/// Phone numbers must carry between this many digits...
const MIN_PHONE_DIGITS: usize = 7;
/// ...and this many (E.164 maximum)
const MAX_PHONE_DIGITS: usize = 15;

/// In-process booking authority for one temple.
///
/// Shared behind an `Arc`; every method takes `&self`.
pub struct BookingEngine {
    config: BookingConfig,
    offset: FixedOffset,
    schedule: Arc<[SlotDefinition]>,
    slots: SlotCapacityTable,
    tickets: TicketStore,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for BookingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingEngine")
            .field("config", &self.config)
            .field("slots", &self.slots)
            .field("tickets", &self.tickets.len())
            .finish_non_exhaustive()
    }
}

impl BookingEngine {
    /// Creates an engine with no days initialized and no tickets issued.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is unusable.
    pub fn new(config: BookingConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let schedule = config.validate()?;
        let offset = config.site_offset()?;

        Ok(Self {
            config,
            offset,
            schedule: schedule.into(),
            slots: SlotCapacityTable::new(),
            tickets: TicketStore::new(),
            clock,
        })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// The daily schedule every date is materialized from
    #[must_use]
    pub fn schedule(&self) -> &[SlotDefinition] {
        &self.schedule
    }

    /// Today's date at the temple
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.local_date(self.clock.now())
    }

    /// Materializes a date's slots ahead of the first booking.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::AlreadyInitialized`] if the date already has
    /// slots. Bookings initialize dates on their own, so this is only needed
    /// to open a date explicitly.
    pub fn initialize_day(&self, date: NaiveDate) -> Result<(), CapacityError> {
        self.slots.initialize_day(date, &self.schedule).map(|_| ())
    }

    /// Reads one slot of an initialized date.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::SlotNotFound`] if the date has no slots yet or
    /// the ordinal is out of range.
    pub fn slot(&self, date: NaiveDate, ordinal: SlotOrdinal) -> Result<TimeSlot, CapacityError> {
        self.slots.get_slot(date, ordinal)
    }

    // ========================================================================
    // Booking
    // ========================================================================

    /// Books seats at the preferred slot, or the nearest later slot with room.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidRequest`] if a field fails validation
    /// - [`BookingError::DateNotSchedulable`] if the date is past the horizon
    /// - [`BookingError::SlotsFull`] if no slot from the preferred one on fits
    /// - [`BookingError::Capacity`] / duplicate ticket ids on broken invariants
    ///
    /// No seats stay reserved when an error is returned.
    pub fn book(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        let result = self.try_book(request);

        let outcome = match &result {
            Ok(booking) if booking.was_reassigned() => "reassigned",
            Ok(_) => "confirmed",
            Err(BookingError::InvalidRequest { .. }) => "invalid",
            Err(BookingError::DateNotSchedulable { .. }) => "not_schedulable",
            Err(BookingError::SlotsFull { .. }) => "slots_full",
            Err(_) => "fault",
        };
        booking_metrics::record_booking(outcome);

        result
    }

    fn try_book(&self, request: BookingRequest) -> Result<Booking, BookingError> {
        let now = self.clock.now();
        let today = self.local_date(now);
        let client = self.validate(&request, today)?;
        self.check_horizon(request.date, today)?;

        let BookingRequest {
            date, slot, seats, ..
        } = request;
        let expires_at = now
            .checked_add_signed(self.config.validity_window())
            .ok_or_else(|| {
                BookingError::invalid(
                    InvalidField::Date,
                    "ticket expiry falls outside the supported calendar",
                )
            })?;

        let day = self.slots.ensure_day(date, &self.schedule);
        let guard = day.lock();

        let snapshot = guard.snapshot();
        let assigned = overflow::find_slot(&snapshot, slot, seats).map_err(|full| {
            tracing::info!(%date, from = %full.from, seats, "No slot has room");
            BookingError::SlotsFull {
                date,
                from: full.from,
                seats: full.seats,
            }
        })?;

        let reserved = guard.reserve(assigned.ordinal, seats).map_err(|err| {
            report_fault(&err);
            BookingError::Capacity(err)
        })?;

        let ticket = Ticket {
            id: TicketId::new(),
            client,
            date,
            slot: reserved.ordinal,
            slot_starts_at: reserved.starts_at,
            requested_slot: slot,
            seats,
            qr_token: QrToken::generate(),
            issued_at: now,
            expires_at,
            status: TicketStatus::Booked,
            status_changed_at: None,
            priority: Priority::for_seats(seats),
        };

        if let Err(err) = self.tickets.put(ticket.clone()) {
            tracing::error!(ticket_id = %ticket.id, error = %err, "Failed to store ticket, rolling back reservation");
            booking_metrics::record_invariant_fault();
            match guard.release(reserved.ordinal, seats) {
                Ok(_) => booking_metrics::record_seats_released(seats, ReleaseReason::Rollback),
                Err(release_err) => report_fault(&release_err),
            }
            return Err(err.into());
        }
        drop(guard);

        booking_metrics::record_seats_reserved(seats);
        let booking = Booking { ticket };

        if booking.was_reassigned() {
            tracing::warn!(
                ticket_id = %booking.ticket.id,
                %date,
                requested = %slot,
                assigned = %booking.assigned_slot(),
                seats,
                "Preferred slot full, booking moved to a later slot"
            );
        } else {
            tracing::info!(
                ticket_id = %booking.ticket.id,
                %date,
                slot = %booking.assigned_slot(),
                seats,
                "Booking confirmed"
            );
        }

        Ok(booking)
    }

    /// Checks every field and returns the normalized client details
    fn validate(&self, request: &BookingRequest, today: NaiveDate) -> Result<ClientInfo, BookingError> {
        if request.date < today {
            return Err(BookingError::invalid(
                InvalidField::Date,
                format!("{} is in the past", request.date),
            ));
        }

        if request.seats == 0 {
            return Err(BookingError::invalid(InvalidField::Seats, "at least one seat is required"));
        }
        if request.seats > self.config.max_seats_per_booking {
            return Err(BookingError::invalid(
                InvalidField::Seats,
                format!(
                    "at most {} seats per booking",
                    self.config.max_seats_per_booking
                ),
            ));
        }

        if request.slot.index() >= self.schedule.len() {
            return Err(BookingError::invalid(
                InvalidField::Slot,
                format!("slot {} is not in the schedule", request.slot),
            ));
        }

        let name = request.client.name.trim();
        if name.is_empty() {
            return Err(BookingError::invalid(InvalidField::Name, "must not be empty"));
        }

        let email = request.client.email.trim();
        if !is_plausible_email(email) {
            return Err(BookingError::invalid(
                InvalidField::Email,
                format!("'{email}' is not a valid email address"),
            ));
        }

        let phone = request
            .client
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty());
        if let Some(phone) = phone {
            if !is_plausible_phone(phone) {
                return Err(BookingError::invalid(
                    InvalidField::Phone,
                    format!("'{phone}' is not a valid phone number"),
                ));
            }
        }

        Ok(ClientInfo::new(name, email, phone.map(str::to_owned)))
    }

    fn check_horizon(&self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
        let horizon_days = self.config.booking_horizon_days;
        let last = today
            .checked_add_days(Days::new(u64::from(horizon_days)))
            .unwrap_or(NaiveDate::MAX);

        if date > last {
            return Err(BookingError::DateNotSchedulable { date, horizon_days });
        }
        Ok(())
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// Availability of every slot on a date.
    ///
    /// Dates not yet materialized report the full schedule as empty. Never
    /// takes a date's writer lock.
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRequest`] for past dates,
    /// [`BookingError::DateNotSchedulable`] beyond the horizon.
    pub fn list_availability(&self, date: NaiveDate) -> Result<Vec<SlotAvailability>, BookingError> {
        let today = self.today();
        if date < today {
            return Err(BookingError::invalid(
                InvalidField::Date,
                format!("{date} is in the past"),
            ));
        }
        self.check_horizon(date, today)?;

        let slots = self.slots.snapshot(date).unwrap_or_else(|| self.empty_day());
        Ok(availability::summarize(&slots, self.config.filling_threshold))
    }

    fn empty_day(&self) -> Vec<TimeSlot> {
        self.schedule
            .iter()
            .zip(0u16..)
            .map(|(definition, ordinal)| TimeSlot {
                ordinal: SlotOrdinal::new(ordinal),
                starts_at: definition.starts_at,
                capacity: definition.capacity,
                booked: 0,
            })
            .collect()
    }

    // ========================================================================
    // Tickets
    // ========================================================================

    /// Looks up a ticket.
    ///
    /// # Errors
    ///
    /// [`crate::TicketError::TicketNotFound`] for unknown ids.
    pub fn ticket(&self, id: TicketId) -> Result<Ticket, BookingError> {
        Ok(self.tickets.get(id)?)
    }

    /// Looks up the ticket a scanned QR token belongs to
    #[must_use]
    pub fn ticket_by_qr(&self, token: &QrToken) -> Option<Ticket> {
        self.tickets.find_by_qr(token)
    }

    /// Every ticket booked under an email address, oldest first
    #[must_use]
    pub fn tickets_for_email(&self, email: &str) -> Vec<Ticket> {
        self.tickets.list_by_email(email)
    }

    /// Number of tickets issued so far
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    /// Cancels a booked ticket and returns its seats to the slot.
    ///
    /// # Errors
    ///
    /// - `TicketNotFound`, `AlreadyCancelled`, `AlreadyExpired`, `AlreadyUsed`
    /// - [`BookingError::Capacity`] if the release trips a guard
    pub fn cancel(&self, id: TicketId) -> Result<Ticket, BookingError> {
        let ticket = self.tickets.cancel(id, self.clock.now())?;
        self.release(&ticket, ReleaseReason::Cancelled)?;

        tracing::info!(
            ticket_id = %ticket.id,
            date = %ticket.date,
            slot = %ticket.slot,
            seats = ticket.seats,
            "Ticket cancelled"
        );
        Ok(ticket)
    }

    /// Marks a booked ticket as used at the gate. Its seats stay consumed.
    ///
    /// # Errors
    ///
    /// `TicketNotFound`, `AlreadyCancelled`, `AlreadyExpired`, `AlreadyUsed`.
    pub fn redeem(&self, id: TicketId) -> Result<Ticket, BookingError> {
        let ticket = self.tickets.redeem(id, self.clock.now())?;
        booking_metrics::record_redeemed();

        tracing::info!(ticket_id = %ticket.id, date = %ticket.date, slot = %ticket.slot, "Ticket redeemed");
        Ok(ticket)
    }

    /// Expires every booked ticket whose validity window has elapsed and
    /// returns their seats. Returns the expired tickets.
    ///
    /// A release that trips a capacity guard is logged as a fault; the
    /// remaining tickets are still processed.
    pub fn expire_overdue(&self) -> Vec<Ticket> {
        let expired = self.tickets.expire_overdue(self.clock.now());

        for ticket in &expired {
            if self.release(ticket, ReleaseReason::Expired).is_ok() {
                tracing::info!(
                    ticket_id = %ticket.id,
                    date = %ticket.date,
                    slot = %ticket.slot,
                    seats = ticket.seats,
                    "Ticket expired"
                );
            }
        }

        expired
    }

    fn release(&self, ticket: &Ticket, reason: ReleaseReason) -> Result<(), CapacityError> {
        match self.slots.release(ticket.date, ticket.slot, ticket.seats) {
            Ok(_) => {
                booking_metrics::record_seats_released(ticket.seats, reason);
                Ok(())
            }
            Err(err) => {
                tracing::error!(ticket_id = %ticket.id, reason = reason.as_str(), "Seat release failed");
                report_fault(&err);
                Err(err)
            }
        }
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

fn report_fault(err: &CapacityError) {
    tracing::error!(error = %err, "Capacity invariant violated");
    booking_metrics::record_invariant_fault();
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_plausible_phone(phone: &str) -> bool {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let digits = body.chars().filter(char::is_ascii_digit).count();

    body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::availability::SlotStatus;
    use crate::config::ScheduleConfig;
    use crate::error::TicketError;
    use crate::types::Capacity;
    use chrono::{NaiveTime, TimeZone};

    struct StaticClock(DateTime<Utc>);

    impl Clock for StaticClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    // 11:30 at the temple
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 11, 1, 6, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    fn tomorrow() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    fn engine_with(capacity: u32, slot_count: u16) -> BookingEngine {
        let config = BookingConfig {
            schedule: ScheduleConfig {
                first_slot: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                interval_minutes: 30,
                slot_count,
                capacity_per_slot: capacity,
            },
            ..BookingConfig::default()
        };
        BookingEngine::new(config, Arc::new(StaticClock(now()))).unwrap()
    }

    fn request(slot: u16, seats: u32) -> BookingRequest {
        BookingRequest {
            date: tomorrow(),
            slot: SlotOrdinal::new(slot),
            seats,
            client: ClientInfo::new("Meera Iyer", "meera@example.com", None),
        }
    }

    fn booked(engine: &BookingEngine, slot: u16) -> u32 {
        engine.slot(tomorrow(), SlotOrdinal::new(slot)).unwrap().booked
    }

    fn invalid_field(result: Result<Booking, BookingError>) -> InvalidField {
        match result {
            Err(BookingError::InvalidRequest { field, .. }) => field,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_preferred_slot_is_kept_when_it_has_room() {
        let engine = engine_with(100, 3);
        let booking = engine.book(request(1, 4)).unwrap();

        assert_eq!(booking.assigned_slot(), SlotOrdinal::new(1));
        assert!(!booking.was_reassigned());
        assert_eq!(booking.ticket.status, TicketStatus::Booked);
        assert_eq!(booking.ticket.slot_label(), "08:30 AM");
        assert_eq!(booking.ticket.expires_at, now() + chrono::Duration::hours(24));
        assert_eq!(booked(&engine, 1), 4);
        assert_eq!(engine.ticket(booking.ticket.id).unwrap(), booking.ticket);
    }

    #[test]
    fn test_nearly_full_slot_moves_booking_later() {
        let engine = engine_with(100, 3);
        for _ in 0..9 {
            engine.book(request(0, 10)).unwrap();
        }
        engine.book(request(0, 5)).unwrap();
        assert_eq!(booked(&engine, 0), 95);

        let booking = engine.book(request(0, 10)).unwrap();

        assert_eq!(booking.requested_slot(), SlotOrdinal::new(0));
        assert_eq!(booking.assigned_slot(), SlotOrdinal::new(1));
        assert!(booking.was_reassigned());
        assert_eq!(booked(&engine, 0), 95);
        assert_eq!(booked(&engine, 1), 10);
    }

    #[test]
    fn test_all_later_slots_full_leaves_table_unchanged() {
        let engine = engine_with(10, 2);
        engine.book(request(0, 10)).unwrap();
        engine.book(request(1, 10)).unwrap();
        let issued = engine.ticket_count();

        let err = engine.book(request(0, 1)).unwrap_err();

        assert_eq!(
            err,
            BookingError::SlotsFull {
                date: tomorrow(),
                from: SlotOrdinal::new(0),
                seats: 1
            }
        );
        assert_eq!(booked(&engine, 0), 10);
        assert_eq!(booked(&engine, 1), 10);
        assert_eq!(engine.ticket_count(), issued);
    }

    #[test]
    fn test_earlier_free_slot_is_not_used() {
        let engine = engine_with(10, 2);
        engine.book(request(1, 10)).unwrap();

        assert!(matches!(
            engine.book(request(1, 1)),
            Err(BookingError::SlotsFull { .. })
        ));
        assert_eq!(booked(&engine, 0), 0);
    }

    #[test]
    fn test_request_validation() {
        let engine = engine_with(100, 3);

        let mut past = request(0, 1);
        past.date = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        assert_eq!(invalid_field(engine.book(past)), InvalidField::Date);

        assert_eq!(invalid_field(engine.book(request(0, 0))), InvalidField::Seats);
        assert_eq!(invalid_field(engine.book(request(0, 11))), InvalidField::Seats);
        assert_eq!(invalid_field(engine.book(request(3, 1))), InvalidField::Slot);

        let mut nameless = request(0, 1);
        nameless.client.name = "   ".to_string();
        assert_eq!(invalid_field(engine.book(nameless)), InvalidField::Name);

        for email in ["", "meera", "meera@", "@example.com", "meera@example", "me era@example.com", "a@b@c.com"] {
            let mut bad = request(0, 1);
            bad.client.email = email.to_string();
            assert_eq!(invalid_field(engine.book(bad)), InvalidField::Email, "{email}");
        }

        for phone in ["12345", "98765abc43", "+91 98765 43210 12345", "++919876543210"] {
            let mut bad = request(0, 1);
            bad.client.phone = Some(phone.to_string());
            assert_eq!(invalid_field(engine.book(bad)), InvalidField::Phone, "{phone}");
        }

        assert_eq!(engine.ticket_count(), 0);
        assert!(engine.slot(tomorrow(), SlotOrdinal::new(0)).is_err());
    }

    #[test]
    fn test_client_details_are_normalized() {
        let engine = engine_with(100, 3);
        let mut req = request(0, 1);
        req.client = ClientInfo::new(
            "  Meera Iyer ",
            " meera@example.com ",
            Some(" +91 98765-43210 ".to_string()),
        );

        let ticket = engine.book(req).unwrap().ticket;
        assert_eq!(ticket.client.name, "Meera Iyer");
        assert_eq!(ticket.client.email, "meera@example.com");
        assert_eq!(ticket.client.phone.as_deref(), Some("+91 98765-43210"));

        let mut blank_phone = request(0, 1);
        blank_phone.client.phone = Some("  ".to_string());
        assert_eq!(engine.book(blank_phone).unwrap().ticket.client.phone, None);
    }

    #[test]
    fn test_horizon() {
        let engine = engine_with(100, 3);

        let mut last = request(0, 1);
        last.date = today().checked_add_days(Days::new(30)).unwrap();
        assert!(engine.book(last).is_ok());

        let mut beyond = request(0, 1);
        beyond.date = today().checked_add_days(Days::new(31)).unwrap();
        assert_eq!(
            engine.book(beyond.clone()).unwrap_err(),
            BookingError::DateNotSchedulable {
                date: beyond.date,
                horizon_days: 30
            }
        );
        assert!(engine.list_availability(beyond.date).is_err());
    }

    #[test]
    fn test_unrepresentable_expiry_reserves_nothing() {
        let end_of_calendar = DateTime::<Utc>::MAX_UTC - chrono::Duration::hours(1);
        let config = BookingConfig {
            utc_offset_minutes: 0,
            ..BookingConfig::default()
        };
        let engine = BookingEngine::new(config, Arc::new(StaticClock(end_of_calendar))).unwrap();

        let mut req = request(0, 4);
        req.date = engine.today();
        assert_eq!(invalid_field(engine.book(req)), InvalidField::Date);

        assert_eq!(engine.ticket_count(), 0);
        assert!(engine.slot(engine.today(), SlotOrdinal::new(0)).is_err());
    }

    #[test]
    fn test_oversized_window_is_rejected_at_construction() {
        let config = BookingConfig {
            validity_window_hours: u32::MAX,
            ..BookingConfig::default()
        };
        assert!(matches!(
            BookingEngine::new(config, Arc::new(StaticClock(now()))),
            Err(ConfigError::ValidityWindowTooLong { .. })
        ));
    }

    #[test]
    fn test_today_follows_site_offset() {
        // 20:00 UTC is already the next morning in India
        let late = Utc.with_ymd_and_hms(2026, 11, 1, 20, 0, 0).unwrap();
        let engine = BookingEngine::new(BookingConfig::default(), Arc::new(StaticClock(late))).unwrap();

        assert_eq!(engine.today(), tomorrow());
        let mut req = request(0, 1);
        req.date = today();
        assert_eq!(invalid_field(engine.book(req)), InvalidField::Date);
    }

    #[test]
    fn test_priority_is_derived_from_party_size() {
        let engine = engine_with(100, 3);
        assert_eq!(engine.book(request(0, 5)).unwrap().ticket.priority, Priority::Normal);
        assert_eq!(engine.book(request(0, 6)).unwrap().ticket.priority, Priority::Low);
    }

    #[test]
    fn test_list_availability_for_uninitialized_and_booked_dates() {
        let engine = engine_with(20, 3);

        let empty = engine.list_availability(tomorrow()).unwrap();
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(|line| line.available == 20 && line.status == SlotStatus::Available));

        engine.book(request(0, 10)).unwrap();
        engine.book(request(0, 10)).unwrap();
        engine.book(request(1, 10)).unwrap();

        let lines = engine.list_availability(tomorrow()).unwrap();
        let statuses: Vec<SlotStatus> = lines.iter().map(|line| line.status).collect();
        assert_eq!(statuses, vec![SlotStatus::Full, SlotStatus::Filling, SlotStatus::Available]);
        assert_eq!(lines.first().unwrap().occupancy_percent, 100);
        assert_eq!(lines.get(1).unwrap().capacity, Capacity::new(20));
    }

    #[test]
    fn test_list_availability_rejects_past_dates() {
        let engine = engine_with(20, 3);
        let yesterday = NaiveDate::from_ymd_opt(2026, 10, 31).unwrap();
        assert!(matches!(
            engine.list_availability(yesterday),
            Err(BookingError::InvalidRequest {
                field: InvalidField::Date,
                ..
            })
        ));
        assert!(engine.list_availability(today()).is_ok());
    }

    #[test]
    fn test_initialize_day_then_book() {
        let engine = engine_with(20, 3);
        engine.initialize_day(tomorrow()).unwrap();
        assert_eq!(
            engine.initialize_day(tomorrow()),
            Err(CapacityError::AlreadyInitialized { date: tomorrow() })
        );

        engine.book(request(2, 3)).unwrap();
        assert_eq!(booked(&engine, 2), 3);
    }

    #[test]
    fn test_cancel_restores_capacity_once() {
        let engine = engine_with(20, 3);
        let ticket = engine.book(request(1, 7)).unwrap().ticket;
        assert_eq!(booked(&engine, 1), 7);

        let cancelled = engine.cancel(ticket.id).unwrap();
        assert_eq!(cancelled.status, TicketStatus::Cancelled);
        assert_eq!(booked(&engine, 1), 0);

        assert_eq!(
            engine.cancel(ticket.id),
            Err(BookingError::Ticket(TicketError::AlreadyCancelled(ticket.id)))
        );
        assert_eq!(booked(&engine, 1), 0);
    }

    #[test]
    fn test_redeemed_ticket_keeps_its_seats() {
        let engine = engine_with(20, 3);
        let ticket = engine.book(request(0, 2)).unwrap().ticket;

        assert_eq!(engine.redeem(ticket.id).unwrap().status, TicketStatus::Used);
        assert_eq!(booked(&engine, 0), 2);
        assert_eq!(
            engine.cancel(ticket.id),
            Err(BookingError::Ticket(TicketError::AlreadyUsed(ticket.id)))
        );
        assert!(engine.expire_overdue().is_empty());
    }

    #[test]
    fn test_lookups() {
        let engine = engine_with(20, 3);
        let ticket = engine.book(request(0, 2)).unwrap().ticket;

        assert_eq!(engine.ticket_by_qr(&ticket.qr_token).unwrap().id, ticket.id);
        assert!(engine.ticket_by_qr(&QrToken::new("QR-UNKNOWN")).is_none());
        assert_eq!(engine.tickets_for_email("MEERA@example.com").len(), 1);

        let unknown = TicketId::new();
        assert_eq!(
            engine.ticket(unknown),
            Err(BookingError::Ticket(TicketError::TicketNotFound(unknown)))
        );
    }

    #[test]
    fn test_plausibility_helpers() {
        assert!(is_plausible_email("devotee@temple.org.in"));
        assert!(is_plausible_phone("+919876543210"));
        assert!(is_plausible_phone("040-2345 6789"));
        assert!(!is_plausible_phone("+91-"));
    }
}
