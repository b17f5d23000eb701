//! Controllable time source for expiry tests

use leafscan_client_core::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// A clock whose time only moves when the test says so
///
/// # Examples
///
/// ```
/// use leafscan_test_utils::ManualClock;
/// use leafscan_client_core::Clock;
///
/// let clock = ManualClock::new(0);
/// clock.advance_minutes(29);
/// assert_eq!(clock.now_ms(), 29 * 60 * 1000);
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    /// Create a clock starting at the given epoch-millisecond instant
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    /// Jump to an absolute instant
    pub fn set_ms(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    /// Advance by a number of milliseconds
    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Advance by whole minutes
    pub fn advance_minutes(&self, minutes: i64) {
        self.advance_ms(minutes * 60 * 1000);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}
