//! HTTP/JSON API for the darshan booking engine.
//!
//! A thin shell over [`darshan_core::BookingEngine`]: handlers parse the
//! request, call one engine operation and map the result (or
//! [`darshan_core::BookingError`]) to a response.
//!
//! # Routes
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/health` | liveness |
//! | GET | `/metrics` | Prometheus scrape |
//! | GET | `/api/v1/slots/:date` | list availability |
//! | POST | `/api/v1/bookings` | book |
//! | GET | `/api/v1/tickets/:id` | get ticket |
//! | POST | `/api/v1/tickets/:id/cancel` | cancel |
//! | POST | `/api/v1/tickets/:id/redeem` | redeem |
//! | GET | `/api/v1/tickets?email=` / `?qr=` | search tickets |
//!
//! # Example
//!
//! ```
//! use darshan_core::{BookingConfig, BookingEngine, environment::SystemClock};
//! use darshan_web::{AppState, build_router};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = BookingEngine::new(BookingConfig::default(), Arc::new(SystemClock))?;
//! let app = build_router(AppState::new(Arc::new(engine)));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::CorrelationId;
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
