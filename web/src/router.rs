//! Router configuration.

use crate::handlers::{bookings, health, metrics, slots, tickets};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health` and `GET /metrics` at the root
/// - booking API under `/api/v1`
/// - request tracing and correlation IDs on every route
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Availability (read side, never blocks bookings)
        .route("/slots/:date", get(slots::get_day_availability))
        // Bookings
        .route("/bookings", post(bookings::create_booking))
        // Tickets
        .route("/tickets", get(tickets::search_tickets))
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/cancel", post(tickets::cancel_ticket))
        .route("/tickets/:id/redeem", post(tickets::redeem_ticket));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::render_metrics))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
