//! Ticket store.
//!
//! Append-only record of issued tickets. Tickets are never removed; only their
//! status moves forward. The store owns the records and hands out clones.
//!
//! Status transitions that free seats (`cancel`, `expire_overdue`) return the
//! affected tickets so the allocator can release their capacity exactly once:
//! a ticket leaves `Booked` at most one time, so at most one release follows.

use crate::error::TicketError;
use crate::types::{QrToken, Ticket, TicketId, TicketStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<TicketId, Ticket>,
    by_qr: HashMap<QrToken, TicketId>,
}

/// In-process authority for issued tickets
#[derive(Debug, Default)]
pub struct TicketStore {
    records: RwLock<Records>,
}

impl TicketStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a newly issued ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::DuplicateTicketId`] if the id, or the QR token,
    /// is already bound to a stored ticket.
    pub fn put(&self, ticket: Ticket) -> Result<(), TicketError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.by_id.contains_key(&ticket.id) || records.by_qr.contains_key(&ticket.qr_token) {
            return Err(TicketError::DuplicateTicketId(ticket.id));
        }

        records.by_qr.insert(ticket.qr_token.clone(), ticket.id);
        records.by_id.insert(ticket.id, ticket);
        Ok(())
    }

    /// Looks up a ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::TicketNotFound`] for unknown ids.
    pub fn get(&self, id: TicketId) -> Result<Ticket, TicketError> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(&id)
            .cloned()
            .ok_or(TicketError::TicketNotFound(id))
    }

    /// Looks up the ticket a scanned QR token belongs to
    #[must_use]
    pub fn find_by_qr(&self, token: &QrToken) -> Option<Ticket> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records
            .by_qr
            .get(token)
            .and_then(|id| records.by_id.get(id))
            .cloned()
    }

    /// All tickets booked under an email address (case-insensitive), oldest first
    #[must_use]
    pub fn list_by_email(&self, email: &str) -> Vec<Ticket> {
        let email = email.trim();
        let mut tickets: Vec<Ticket> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .values()
            .filter(|ticket| ticket.client.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| (ticket.issued_at, ticket.id));
        tickets
    }

    /// Number of stored tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves a `Booked` ticket to `Cancelled` and returns it.
    ///
    /// The caller is responsible for releasing the returned ticket's seats.
    ///
    /// # Errors
    ///
    /// - [`TicketError::TicketNotFound`] for unknown ids
    /// - [`TicketError::AlreadyCancelled`], [`TicketError::AlreadyUsed`]
    /// - [`TicketError::AlreadyExpired`] if expired, or overdue but not yet
    ///   swept (the sweep will release it)
    pub fn cancel(&self, id: TicketId, now: DateTime<Utc>) -> Result<Ticket, TicketError> {
        self.transition(id, now, TicketStatus::Cancelled)
    }

    /// Moves a `Booked` ticket to `Used` when it is scanned at the gate.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cancel`].
    pub fn redeem(&self, id: TicketId, now: DateTime<Utc>) -> Result<Ticket, TicketError> {
        self.transition(id, now, TicketStatus::Used)
    }

    /// Moves every overdue `Booked` ticket to `Expired` and returns them.
    ///
    /// The caller is responsible for releasing the returned tickets' seats.
    /// Tickets in any other status are left alone, so repeated sweeps return
    /// each ticket at most once.
    pub fn expire_overdue(&self, now: DateTime<Utc>) -> Vec<Ticket> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let mut expired: Vec<Ticket> = records
            .by_id
            .values_mut()
            .filter(|ticket| ticket.is_overdue(now))
            .map(|ticket| {
                ticket.status = TicketStatus::Expired;
                ticket.status_changed_at = Some(now);
                ticket.clone()
            })
            .collect();
        expired.sort_by_key(|ticket| (ticket.expires_at, ticket.id));
        expired
    }

    fn transition(
        &self,
        id: TicketId,
        now: DateTime<Utc>,
        to: TicketStatus,
    ) -> Result<Ticket, TicketError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let ticket = records
            .by_id
            .get_mut(&id)
            .ok_or(TicketError::TicketNotFound(id))?;

        match ticket.status {
            TicketStatus::Cancelled => return Err(TicketError::AlreadyCancelled(id)),
            TicketStatus::Expired => return Err(TicketError::AlreadyExpired(id)),
            TicketStatus::Used => return Err(TicketError::AlreadyUsed(id)),
            TicketStatus::Booked if ticket.is_overdue(now) => {
                return Err(TicketError::AlreadyExpired(id));
            }
            TicketStatus::Booked => {}
        }

        ticket.status = to;
        ticket.status_changed_at = Some(now);
        Ok(ticket.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ClientInfo, Priority, SlotOrdinal};
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 11, 1, 6, 0, 0).unwrap()
    }

    fn ticket(email: &str, issued_at: DateTime<Utc>) -> Ticket {
        Ticket {
            id: TicketId::new(),
            client: ClientInfo::new("Ravi", email, None),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            slot: SlotOrdinal::new(3),
            slot_starts_at: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            requested_slot: SlotOrdinal::new(3),
            seats: 2,
            qr_token: QrToken::generate(),
            issued_at,
            expires_at: issued_at + Duration::hours(24),
            status: TicketStatus::Booked,
            status_changed_at: None,
            priority: Priority::Normal,
        }
    }

    #[test]
    fn test_put_and_get() {
        let store = TicketStore::new();
        let t = ticket("ravi@example.com", now());
        store.put(t.clone()).unwrap();

        assert_eq!(store.get(t.id).unwrap(), t);
        assert_eq!(store.find_by_qr(&t.qr_token).unwrap().id, t.id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let store = TicketStore::new();
        let t = ticket("ravi@example.com", now());
        store.put(t.clone()).unwrap();

        assert_eq!(store.put(t.clone()), Err(TicketError::DuplicateTicketId(t.id)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_qr_token_is_rejected() {
        let store = TicketStore::new();
        let first = ticket("ravi@example.com", now());
        let mut second = ticket("ravi@example.com", now());
        second.qr_token = first.qr_token.clone();
        store.put(first).unwrap();

        assert_eq!(
            store.put(second.clone()),
            Err(TicketError::DuplicateTicketId(second.id))
        );
    }

    #[test]
    fn test_get_unknown() {
        let store = TicketStore::new();
        let id = TicketId::new();
        assert_eq!(store.get(id), Err(TicketError::TicketNotFound(id)));
    }

    #[test]
    fn test_cancel_twice() {
        let store = TicketStore::new();
        let t = ticket("ravi@example.com", now());
        store.put(t.clone()).unwrap();

        let cancelled = store.cancel(t.id, now()).unwrap();
        assert_eq!(cancelled.status, TicketStatus::Cancelled);
        assert_eq!(cancelled.status_changed_at, Some(now()));

        assert_eq!(store.cancel(t.id, now()), Err(TicketError::AlreadyCancelled(t.id)));
    }

    #[test]
    fn test_redeem_then_cancel() {
        let store = TicketStore::new();
        let t = ticket("ravi@example.com", now());
        store.put(t.clone()).unwrap();

        assert_eq!(store.redeem(t.id, now()).unwrap().status, TicketStatus::Used);
        assert_eq!(store.cancel(t.id, now()), Err(TicketError::AlreadyUsed(t.id)));
    }

    #[test]
    fn test_expire_overdue_only_touches_booked_once() {
        let store = TicketStore::new();
        let overdue = ticket("a@example.com", now() - Duration::hours(30));
        let fresh = ticket("b@example.com", now());
        let cancelled = ticket("c@example.com", now() - Duration::hours(30));
        store.put(overdue.clone()).unwrap();
        store.put(fresh.clone()).unwrap();
        store.put(cancelled.clone()).unwrap();
        store.cancel(cancelled.id, now() - Duration::hours(29)).unwrap();

        let expired = store.expire_overdue(now());
        assert_eq!(expired.len(), 1);
        assert_eq!(expired.first().unwrap().id, overdue.id);
        assert_eq!(store.get(overdue.id).unwrap().status, TicketStatus::Expired);
        assert_eq!(store.get(fresh.id).unwrap().status, TicketStatus::Booked);
        assert_eq!(store.get(cancelled.id).unwrap().status, TicketStatus::Cancelled);

        assert!(store.expire_overdue(now()).is_empty());
        assert_eq!(store.cancel(overdue.id, now()), Err(TicketError::AlreadyExpired(overdue.id)));
    }

    #[test]
    fn test_overdue_but_unswept_cannot_be_cancelled() {
        let store = TicketStore::new();
        let t = ticket("ravi@example.com", now() - Duration::hours(25));
        store.put(t.clone()).unwrap();

        assert_eq!(store.cancel(t.id, now()), Err(TicketError::AlreadyExpired(t.id)));
        assert_eq!(store.get(t.id).unwrap().status, TicketStatus::Booked);
    }

    #[test]
    fn test_list_by_email_is_case_insensitive_and_ordered() {
        let store = TicketStore::new();
        let later = ticket("Ravi@Example.com", now());
        let earlier = ticket("ravi@example.com", now() - Duration::hours(1));
        store.put(later.clone()).unwrap();
        store.put(earlier.clone()).unwrap();
        store.put(ticket("other@example.com", now())).unwrap();

        let ids: Vec<TicketId> = store
            .list_by_email(" RAVI@example.com ")
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
    }
}
