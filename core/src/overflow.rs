//! Overflow search.
//!
//! Finds the slot a request should land in: the preferred slot if it has
//! room, otherwise the nearest *later* slot that does. The scan never goes
//! backwards, so a devotee is never moved to an earlier time than asked for.

use crate::capacity::TimeSlot;
use crate::types::SlotOrdinal;
use thiserror::Error;

/// No slot at or after the preferred one can take the request
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no slot from {from} onwards has {seats} seats available")]
pub struct NoSlotAvailable {
    /// Where the search started
    pub from: SlotOrdinal,
    /// Seats requested
    pub seats: u32,
}

/// Returns the first slot, starting at `preferred`, with at least `seats` free.
///
/// `slots` must be one day's snapshot in ordinal order. Take it under the
/// day's writer lock when the result will be reserved.
///
/// # Errors
///
/// Returns [`NoSlotAvailable`] if no slot in `preferred..` qualifies,
/// including when `preferred` is past the end of the day.
pub fn find_slot(
    slots: &[TimeSlot],
    preferred: SlotOrdinal,
    seats: u32,
) -> Result<&TimeSlot, NoSlotAvailable> {
    slots
        .get(preferred.index()..)
        .and_then(|remaining| remaining.iter().find(|slot| slot.available() >= seats))
        .ok_or(NoSlotAvailable {
            from: preferred,
            seats,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Capacity;
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn day(booked: &[u32], capacity: u32) -> Vec<TimeSlot> {
        booked
            .iter()
            .zip(0u16..)
            .map(|(booked, ordinal)| TimeSlot {
                ordinal: SlotOrdinal::new(ordinal),
                starts_at: NaiveTime::from_hms_opt(8, u32::from(ordinal) % 60, 0).unwrap(),
                capacity: Capacity::new(capacity),
                booked: *booked,
            })
            .collect()
    }

    #[test]
    fn test_preferred_slot_with_room_is_kept() {
        let slots = day(&[0, 0, 0], 100);
        let found = find_slot(&slots, SlotOrdinal::new(1), 10).unwrap();
        assert_eq!(found.ordinal, SlotOrdinal::new(1));
    }

    #[test]
    fn test_nearly_full_slot_overflows_to_next_with_room() {
        // 95 of 100 booked, 10 wanted: skip to the next slot that fits
        let slots = day(&[95, 92, 40], 100);
        let found = find_slot(&slots, SlotOrdinal::new(0), 10).unwrap();
        assert_eq!(found.ordinal, SlotOrdinal::new(2));
    }

    #[test]
    fn test_earlier_slots_are_never_considered() {
        let slots = day(&[0, 100, 100], 100);
        let err = find_slot(&slots, SlotOrdinal::new(1), 1).unwrap_err();
        assert_eq!(
            err,
            NoSlotAvailable {
                from: SlotOrdinal::new(1),
                seats: 1
            }
        );
    }

    #[test]
    fn test_preferred_past_end_of_day() {
        let slots = day(&[0, 0], 100);
        assert!(find_slot(&slots, SlotOrdinal::new(2), 1).is_err());
        assert!(find_slot(&slots, SlotOrdinal::new(40), 1).is_err());
    }

    #[test]
    fn test_exact_fit_is_accepted() {
        let slots = day(&[90], 100);
        assert!(find_slot(&slots, SlotOrdinal::new(0), 10).is_ok());
        assert!(find_slot(&slots, SlotOrdinal::new(0), 11).is_err());
    }

    proptest! {
        #[test]
        fn prop_result_is_first_fit_at_or_after_preferred(
            booked in proptest::collection::vec(0u32..=20, 1..30),
            preferred in 0u16..35,
            seats in 1u32..=10,
        ) {
            let slots = day(&booked, 20);
            let preferred = SlotOrdinal::new(preferred);

            match find_slot(&slots, preferred, seats) {
                Ok(found) => {
                    prop_assert!(found.ordinal >= preferred);
                    prop_assert!(found.available() >= seats);
                    // Every slot skipped over lacked room
                    for skipped in slots.iter().filter(|s| s.ordinal >= preferred && s.ordinal < found.ordinal) {
                        prop_assert!(skipped.available() < seats);
                    }
                }
                Err(_) => {
                    for slot in slots.iter().filter(|s| s.ordinal >= preferred) {
                        prop_assert!(slot.available() < seats);
                    }
                }
            }
        }
    }
}
