//! Background expiry sweep.
//!
//! Booked tickets past their validity window keep their seats until a sweep
//! moves them to `Expired`. The sweeper runs [`BookingEngine::expire_overdue`]
//! on a fixed interval until shutdown is signalled.

use darshan_core::BookingEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Run one sweep, returning how many tickets expired.
pub fn sweep_once(engine: &BookingEngine) -> usize {
    let expired = engine.expire_overdue();
    if !expired.is_empty() {
        tracing::info!(count = expired.len(), "Expired overdue tickets");
    }
    expired.len()
}

/// Spawn the sweeper task.
///
/// The task exits when `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_expiry_sweeper(
    engine: Arc<BookingEngine>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = every.as_secs_f64(), "Expiry sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep_once(&engine);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Expiry sweeper stopped");
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use darshan_core::TicketStatus;
    use darshan_testing::{fixtures, mock_clock};

    #[tokio::test]
    async fn test_sweeper_expires_overdue_and_stops() {
        let clock = Arc::new(mock_clock());
        let engine = Arc::new(fixtures::engine(fixtures::small_config(10, 2), clock.clone()));
        let booking = engine
            .book(fixtures::request(fixtures::visit_date(), 0, 4))
            .unwrap();

        let (tx, rx) = watch::channel(false);
        let task = spawn_expiry_sweeper(Arc::clone(&engine), Duration::from_millis(10), rx);

        clock.advance(TimeDelta::hours(24));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let ticket = engine.ticket(booking.ticket.id).unwrap();
        assert_eq!(ticket.status, TicketStatus::Expired);
        assert_eq!(
            engine
                .slot(fixtures::visit_date(), booking.assigned_slot())
                .unwrap()
                .booked,
            0
        );

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_sweep_once_is_quiet_when_nothing_is_due() {
        let engine = fixtures::engine(fixtures::small_config(10, 2), Arc::new(mock_clock()));
        engine
            .book(fixtures::request(fixtures::visit_date(), 1, 2))
            .unwrap();

        assert_eq!(sweep_once(&engine), 0);
    }
}
