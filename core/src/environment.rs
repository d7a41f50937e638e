//! Injected dependencies.
//!
//! The engine never reads the system time directly. It asks a [`Clock`], so
//! tests can pin "now" and move it forward to exercise ticket expiry.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use chrono::{DateTime, Utc};
/// use darshan_core::environment::Clock;
///
/// // Test - fixed time for deterministic tests
/// struct FixedClock {
///     time: DateTime<Utc>,
/// }
///
/// impl Clock for FixedClock {
///     fn now(&self) -> DateTime<Utc> {
///         self.time
///     }
/// }
///
/// let clock = FixedClock { time: Utc::now() };
/// assert_eq!(clock.now(), clock.now());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
