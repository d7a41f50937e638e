//! Slot capacity table.
//!
//! Ground truth for how many seats are booked in each slot of each date.
//!
//! **Concurrency strategy**: every date owns a [`DaySlots`] with its own
//! writer mutex. Mutations go through a [`DayGuard`] obtained from
//! [`DaySlots::lock`], so a search and the reservation that follows it can be
//! made indivisible. Booked counters are atomics updated with a
//! compare-and-swap loop that refuses to cross capacity, which keeps
//! [`SlotCapacityTable::reserve`] linearizable on its own and lets readers
//! take snapshots without touching the mutex.

use crate::config::SlotDefinition;
use crate::error::CapacityError;
use crate::types::{Capacity, SlotOrdinal, slot_label};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Point-in-time view of a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Position within the day
    pub ordinal: SlotOrdinal,
    /// Local start time
    pub starts_at: NaiveTime,
    /// Maximum seats
    pub capacity: Capacity,
    /// Seats currently booked
    pub booked: u32,
}

impl TimeSlot {
    /// Seats still free (`capacity - booked`)
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.capacity.value().saturating_sub(self.booked)
    }

    /// Label such as `09:30 AM`
    #[must_use]
    pub fn label(&self) -> String {
        slot_label(self.starts_at)
    }
}

#[derive(Debug)]
struct SlotCell {
    starts_at: NaiveTime,
    capacity: Capacity,
    booked: AtomicU32,
}

impl SlotCell {
    fn view(&self, ordinal: SlotOrdinal) -> TimeSlot {
        TimeSlot {
            ordinal,
            starts_at: self.starts_at,
            capacity: self.capacity,
            booked: self.booked.load(Ordering::Acquire),
        }
    }
}

/// All slots of one date.
#[derive(Debug)]
pub struct DaySlots {
    date: NaiveDate,
    cells: Box<[SlotCell]>,
    writer: Mutex<()>,
}

impl DaySlots {
    fn new(date: NaiveDate, definitions: &[SlotDefinition]) -> Self {
        let cells = definitions
            .iter()
            .map(|definition| SlotCell {
                starts_at: definition.starts_at,
                capacity: definition.capacity,
                booked: AtomicU32::new(0),
            })
            .collect();

        Self {
            date,
            cells,
            writer: Mutex::new(()),
        }
    }

    /// Date these slots belong to
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Number of slots in the day
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the day has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reads every slot without taking the writer lock.
    ///
    /// Each slot's count is read atomically. Use [`DayGuard::snapshot`] when
    /// the view must stay valid for a subsequent reservation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TimeSlot> {
        self.cells
            .iter()
            .zip(0u16..)
            .map(|(cell, ordinal)| cell.view(SlotOrdinal::new(ordinal)))
            .collect()
    }

    /// Reads one slot without taking the writer lock
    #[must_use]
    pub fn slot(&self, ordinal: SlotOrdinal) -> Option<TimeSlot> {
        self.cells.get(ordinal.index()).map(|cell| cell.view(ordinal))
    }

    /// Takes this date's exclusive writer lock.
    ///
    /// A poisoned lock is recovered: counters are atomics and are never left
    /// half-updated by a panicking holder.
    pub fn lock(&self) -> DayGuard<'_> {
        DayGuard {
            day: self,
            _writer: self.writer.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn cell(&self, ordinal: SlotOrdinal) -> Result<&SlotCell, CapacityError> {
        self.cells
            .get(ordinal.index())
            .ok_or(CapacityError::SlotNotFound {
                date: self.date,
                ordinal,
            })
    }
}

/// Exclusive access to one date's slots.
///
/// Nothing else can reserve or release seats on the date while the guard is
/// alive; readers are unaffected.
#[derive(Debug)]
pub struct DayGuard<'a> {
    day: &'a DaySlots,
    _writer: MutexGuard<'a, ()>,
}

impl DayGuard<'_> {
    /// Snapshot that stays accurate for as long as the guard is held
    #[must_use]
    pub fn snapshot(&self) -> Vec<TimeSlot> {
        self.day.snapshot()
    }

    /// Adds `seats` to the slot's booked count if it stays within capacity.
    ///
    /// # Errors
    ///
    /// - [`CapacityError::SlotNotFound`] if the ordinal is out of range
    /// - [`CapacityError::CapacityExceeded`] if the slot lacks room
    pub fn reserve(&self, ordinal: SlotOrdinal, seats: u32) -> Result<TimeSlot, CapacityError> {
        let cell = self.day.cell(ordinal)?;
        let max = cell.capacity.value();

        cell.booked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |booked| {
                booked.checked_add(seats).filter(|total| *total <= max)
            })
            .map_err(|booked| CapacityError::CapacityExceeded {
                date: self.day.date,
                ordinal,
                requested: seats,
                available: max.saturating_sub(booked),
            })?;

        Ok(cell.view(ordinal))
    }

    /// Removes `seats` from the slot's booked count.
    ///
    /// # Errors
    ///
    /// - [`CapacityError::SlotNotFound`] if the ordinal is out of range
    /// - [`CapacityError::Underflow`] if fewer than `seats` are booked
    pub fn release(&self, ordinal: SlotOrdinal, seats: u32) -> Result<TimeSlot, CapacityError> {
        let cell = self.day.cell(ordinal)?;

        cell.booked
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |booked| {
                booked.checked_sub(seats)
            })
            .map_err(|booked| CapacityError::Underflow {
                date: self.day.date,
                ordinal,
                requested: seats,
                booked,
            })?;

        Ok(cell.view(ordinal))
    }
}

/// Per-date slot capacity, shared by every booking on the node.
#[derive(Debug, Default)]
pub struct SlotCapacityTable {
    days: RwLock<HashMap<NaiveDate, Arc<DaySlots>>>,
}

impl SlotCapacityTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes a date's slots with nothing booked.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::AlreadyInitialized`] if the date exists.
    /// Re-running a day's schedule would silently wipe live bookings, so it
    /// is refused; use [`Self::ensure_day`] for get-or-create.
    pub fn initialize_day(
        &self,
        date: NaiveDate,
        definitions: &[SlotDefinition],
    ) -> Result<Arc<DaySlots>, CapacityError> {
        let mut days = self.days.write().unwrap_or_else(PoisonError::into_inner);
        if days.contains_key(&date) {
            return Err(CapacityError::AlreadyInitialized { date });
        }

        let day = Arc::new(DaySlots::new(date, definitions));
        days.insert(date, Arc::clone(&day));
        tracing::debug!(%date, slots = definitions.len(), "Initialized day");
        Ok(day)
    }

    /// Returns the date's slots, materializing them first if needed.
    ///
    /// Idempotent: an existing day is returned untouched.
    pub fn ensure_day(&self, date: NaiveDate, definitions: &[SlotDefinition]) -> Arc<DaySlots> {
        if let Some(day) = self.day(date) {
            return day;
        }

        let mut days = self.days.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(days.entry(date).or_insert_with(|| {
            tracing::debug!(%date, slots = definitions.len(), "Initialized day on first booking");
            Arc::new(DaySlots::new(date, definitions))
        }))
    }

    /// The date's slots, if initialized
    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<Arc<DaySlots>> {
        self.days
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&date)
            .cloned()
    }

    /// Reads one slot.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::SlotNotFound`] if the date is not initialized
    /// or the ordinal is out of range.
    pub fn get_slot(&self, date: NaiveDate, ordinal: SlotOrdinal) -> Result<TimeSlot, CapacityError> {
        self.day(date)
            .and_then(|day| day.slot(ordinal))
            .ok_or(CapacityError::SlotNotFound { date, ordinal })
    }

    /// Consistent point-in-time copy of the date's slots
    #[must_use]
    pub fn snapshot(&self, date: NaiveDate) -> Option<Vec<TimeSlot>> {
        self.day(date).map(|day| day.snapshot())
    }

    /// Atomically books `seats` in a slot if it stays within capacity.
    ///
    /// # Errors
    ///
    /// [`CapacityError::SlotNotFound`] or [`CapacityError::CapacityExceeded`].
    pub fn reserve(
        &self,
        date: NaiveDate,
        ordinal: SlotOrdinal,
        seats: u32,
    ) -> Result<TimeSlot, CapacityError> {
        let day = self
            .day(date)
            .ok_or(CapacityError::SlotNotFound { date, ordinal })?;
        day.lock().reserve(ordinal, seats)
    }

    /// Returns `seats` to a slot.
    ///
    /// # Errors
    ///
    /// [`CapacityError::SlotNotFound`] or [`CapacityError::Underflow`].
    pub fn release(
        &self,
        date: NaiveDate,
        ordinal: SlotOrdinal,
        seats: u32,
    ) -> Result<TimeSlot, CapacityError> {
        let day = self
            .day(date)
            .ok_or(CapacityError::SlotNotFound { date, ordinal })?;
        day.lock().release(ordinal, seats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
    }

    fn definitions(capacities: &[u32]) -> Vec<SlotDefinition> {
        capacities
            .iter()
            .zip(0u32..)
            .map(|(capacity, i)| {
                SlotDefinition::new(
                    NaiveTime::from_hms_opt(8 + i, 0, 0).unwrap(),
                    Capacity::new(*capacity),
                )
            })
            .collect()
    }

    #[test]
    fn test_initialize_day_twice_is_rejected() {
        let table = SlotCapacityTable::new();
        table.initialize_day(date(), &definitions(&[10, 10])).unwrap();

        let err = table.initialize_day(date(), &definitions(&[10, 10])).unwrap_err();
        assert_eq!(err, CapacityError::AlreadyInitialized { date: date() });
    }

    #[test]
    fn test_ensure_day_keeps_existing_bookings() {
        let table = SlotCapacityTable::new();
        table.initialize_day(date(), &definitions(&[10])).unwrap();
        table.reserve(date(), SlotOrdinal::new(0), 4).unwrap();

        let day = table.ensure_day(date(), &definitions(&[10]));
        assert_eq!(day.slot(SlotOrdinal::new(0)).unwrap().booked, 4);
    }

    #[test]
    fn test_get_slot_unknown_date_or_ordinal() {
        let table = SlotCapacityTable::new();
        assert!(matches!(
            table.get_slot(date(), SlotOrdinal::new(0)),
            Err(CapacityError::SlotNotFound { .. })
        ));

        table.initialize_day(date(), &definitions(&[10])).unwrap();
        assert!(matches!(
            table.get_slot(date(), SlotOrdinal::new(1)),
            Err(CapacityError::SlotNotFound { .. })
        ));
    }

    #[test]
    fn test_reserve_up_to_capacity_then_refuse() {
        let table = SlotCapacityTable::new();
        table.initialize_day(date(), &definitions(&[5])).unwrap();
        let slot = SlotOrdinal::new(0);

        assert_eq!(table.reserve(date(), slot, 3).unwrap().booked, 3);
        assert_eq!(table.reserve(date(), slot, 2).unwrap().available(), 0);

        let err = table.reserve(date(), slot, 1).unwrap_err();
        assert_eq!(
            err,
            CapacityError::CapacityExceeded {
                date: date(),
                ordinal: slot,
                requested: 1,
                available: 0,
            }
        );
        assert_eq!(table.get_slot(date(), slot).unwrap().booked, 5);
    }

    #[test]
    fn test_release_underflow_leaves_count_untouched() {
        let table = SlotCapacityTable::new();
        table.initialize_day(date(), &definitions(&[5])).unwrap();
        let slot = SlotOrdinal::new(0);
        table.reserve(date(), slot, 2).unwrap();

        let err = table.release(date(), slot, 3).unwrap_err();
        assert!(matches!(err, CapacityError::Underflow { booked: 2, .. }));
        assert_eq!(table.get_slot(date(), slot).unwrap().booked, 2);

        assert_eq!(table.release(date(), slot, 2).unwrap().booked, 0);
    }

    #[test]
    fn test_concurrent_reserves_never_oversell() {
        let table = Arc::new(SlotCapacityTable::new());
        table.initialize_day(date(), &definitions(&[50])).unwrap();

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || table.reserve(date(), SlotOrdinal::new(0), 1).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 50);
        assert_eq!(table.get_slot(date(), SlotOrdinal::new(0)).unwrap().booked, 50);
    }
}
