//! Server configuration.
//!
//! Loaded from environment variables (and a `.env` file, if present) with
//! defaults for everything. Engine rules come from [`BookingConfig::default`]
//! and can be overridden one by one through `DARSHAN_*` variables.

use chrono::NaiveTime;
use darshan_core::BookingConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Background expiry sweep settings
    pub sweeper: SweeperConfig,
    /// Booking rules and daily schedule
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset at subscriber init
    pub log_level: String,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
    /// Whether to install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

impl ServerConfig {
    /// `host:port` to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Expiry sweeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Seconds between sweeps
    pub interval_secs: u64,
}

impl SweeperConfig {
    /// Sweep interval as a duration (at least one second)
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Reads `.env` first; variables already set in the environment win.
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }
        let defaults = BookingConfig::default();

        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parsed(&lookup, "PORT").unwrap_or(8080),
                log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
                shutdown_timeout: parsed(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
                metrics_enabled: parsed(&lookup, "METRICS_ENABLED").unwrap_or(true),
            },
            sweeper: SweeperConfig {
                interval_secs: parsed(&lookup, "EXPIRY_SWEEP_INTERVAL_SECS").unwrap_or(60),
            },
            booking: BookingConfig {
                max_seats_per_booking: parsed(&lookup, "DARSHAN_MAX_SEATS_PER_BOOKING")
                    .unwrap_or(defaults.max_seats_per_booking),
                filling_threshold: parsed(&lookup, "DARSHAN_FILLING_THRESHOLD")
                    .unwrap_or(defaults.filling_threshold),
                validity_window_hours: parsed(&lookup, "DARSHAN_VALIDITY_WINDOW_HOURS")
                    .unwrap_or(defaults.validity_window_hours),
                booking_horizon_days: parsed(&lookup, "DARSHAN_BOOKING_HORIZON_DAYS")
                    .unwrap_or(defaults.booking_horizon_days),
                utc_offset_minutes: parsed(&lookup, "DARSHAN_UTC_OFFSET_MINUTES")
                    .unwrap_or(defaults.utc_offset_minutes),
                schedule: darshan_core::ScheduleConfig {
                    first_slot: lookup("DARSHAN_FIRST_SLOT")
                        .as_deref()
                        .and_then(parse_time)
                        .unwrap_or(defaults.schedule.first_slot),
                    interval_minutes: parsed(&lookup, "DARSHAN_SLOT_INTERVAL_MINUTES")
                        .unwrap_or(defaults.schedule.interval_minutes),
                    slot_count: parsed(&lookup, "DARSHAN_SLOT_COUNT").unwrap_or(defaults.schedule.slot_count),
                    capacity_per_slot: parsed(&lookup, "DARSHAN_SLOT_CAPACITY")
                        .unwrap_or(defaults.schedule.capacity_per_slot),
                },
            },
        }
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::from_str(raw))
        .ok()
}
