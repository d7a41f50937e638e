//! Property tests over whole booking sequences.
//!
//! Random runs of bookings, cancellations and gate scans against one date,
//! checking after every step that the capacity table agrees with the tickets
//! that still hold seats.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap

use darshan_core::{BookingEngine, BookingError, SlotOrdinal, TicketId};
use darshan_testing::{fixtures, properties, test_clock};
use proptest::prelude::*;
use std::sync::Arc;

const SLOTS: u16 = 4;
const CAPACITY: u32 = 12;

/// What to do after each booking attempt
#[derive(Debug, Clone, Copy)]
enum FollowUp {
    Nothing,
    CancelOldest,
    RedeemOldest,
}

fn follow_up() -> impl Strategy<Value = FollowUp> {
    prop_oneof![
        2 => Just(FollowUp::Nothing),
        1 => Just(FollowUp::CancelOldest),
        1 => Just(FollowUp::RedeemOldest),
    ]
}

/// Seats the table reports per slot
fn table(engine: &BookingEngine) -> Vec<u32> {
    (0..SLOTS)
        .map(|slot| {
            engine
                .slot(fixtures::visit_date(), SlotOrdinal::new(slot))
                .map_or(0, |s| s.booked)
        })
        .collect()
}

/// Seats the tickets say are held per slot
fn held_by_tickets(engine: &BookingEngine, issued: &[TicketId]) -> Vec<u32> {
    let mut held = vec![0u32; usize::from(SLOTS)];
    for id in issued {
        let ticket = engine.ticket(*id).unwrap();
        if ticket.status.holds_capacity() {
            held[ticket.slot.index()] += ticket.seats;
        }
    }
    held
}

fn check_consistent(engine: &BookingEngine, issued: &[TicketId]) -> Result<(), TestCaseError> {
    let booked = table(engine);
    prop_assert!(booked.iter().all(|b| *b <= CAPACITY), "oversold: {booked:?}");
    prop_assert_eq!(booked, held_by_tickets(engine, issued));
    Ok(())
}

proptest! {
    #[test]
    fn prop_table_matches_live_tickets(
        attempts in properties::booking_attempts(SLOTS, 40),
        follow_ups in proptest::collection::vec(follow_up(), 40),
    ) {
        let engine = fixtures::engine(fixtures::small_config(CAPACITY, SLOTS), Arc::new(test_clock()));
        let mut issued = Vec::new();
        let mut cancellable = std::collections::VecDeque::new();

        for (step, (slot, seats)) in attempts.iter().copied().enumerate() {
            let before = table(&engine);

            match engine.book(fixtures::request_for(fixtures::visit_date(), slot, seats, fixtures::client(step))) {
                Ok(booking) => {
                    prop_assert!(booking.assigned_slot() >= SlotOrdinal::new(slot));
                    issued.push(booking.ticket.id);
                    cancellable.push_back(booking.ticket.id);
                }
                Err(BookingError::SlotsFull { .. }) => {
                    let from = usize::from(slot);
                    prop_assert!(before[from..].iter().all(|b| CAPACITY - b < seats));
                    prop_assert_eq!(table(&engine), before);
                }
                Err(other) => panic!("unexpected booking error: {other}"),
            }
            check_consistent(&engine, &issued)?;

            match follow_ups.get(step).copied().unwrap_or(FollowUp::Nothing) {
                FollowUp::Nothing => {}
                FollowUp::CancelOldest => {
                    if let Some(id) = cancellable.pop_front() {
                        engine.cancel(id).unwrap();
                    }
                }
                FollowUp::RedeemOldest => {
                    if let Some(id) = cancellable.pop_front() {
                        engine.redeem(id).unwrap();
                    }
                }
            }
            check_consistent(&engine, &issued)?;
        }

        for id in cancellable {
            engine.cancel(id).unwrap();
        }
        check_consistent(&engine, &issued)?;
    }

    #[test]
    fn prop_book_then_cancel_returns_to_zero(
        attempts in properties::booking_attempts(SLOTS, 25),
    ) {
        let engine = fixtures::engine(fixtures::small_config(CAPACITY, SLOTS), Arc::new(test_clock()));

        let tickets: Vec<TicketId> = attempts
            .iter()
            .filter_map(|(slot, seats)| engine.book(fixtures::request(fixtures::visit_date(), *slot, *seats)).ok())
            .map(|booking| booking.ticket.id)
            .collect();

        for id in &tickets {
            engine.cancel(*id).unwrap();
        }

        prop_assert_eq!(table(&engine), vec![0; usize::from(SLOTS)]);
    }
}
