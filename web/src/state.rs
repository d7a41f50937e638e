//! Application state shared by every handler.

use darshan_core::BookingEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cheap to clone: the engine is behind an `Arc` and the Prometheus handle is
/// itself a shared reference.
#[derive(Clone)]
pub struct AppState {
    /// The booking authority
    pub engine: Arc<BookingEngine>,
    /// Renders `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state without a metrics endpoint.
    #[must_use]
    pub const fn new(engine: Arc<BookingEngine>) -> Self {
        Self {
            engine,
            metrics: None,
        }
    }

    /// Serve the given Prometheus handle at `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
