//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod bookings;
pub mod health;
pub mod metrics;
pub mod slots;
pub mod tickets;

pub use health::health_check;
