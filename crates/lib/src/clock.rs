//! Time provider abstraction
//!
//! This module provides a [`Clock`] trait that abstracts over time sources,
//! allowing production code to use real system time while tests can use
//! controllable mock time. The ledger stamps every action, cancellation and
//! revision through its clock, so the cancel grace window and the daily
//! limits are driven entirely by it.
//!
//! # Example
//!
//! ```
//! use quorum::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let now = clock.now();
//! assert!(clock.now_millis() >= now.timestamp_millis() as u64);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, TimeZone, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::atomic::{AtomicU64, Ordering};

/// A time provider for getting current timestamps.
///
/// This trait abstracts over time sources to enable:
/// - Controllable time in tests (fixed starting point, manual advance)
/// - Monotonic timestamps within a single clock instance
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as a UTC timestamp.
    fn now(&self) -> DateTime<Utc> {
        millis_to_datetime(self.now_millis())
    }
}

/// Converts milliseconds since the epoch into a UTC timestamp.
///
/// Out-of-range values clamp to the epoch.
pub fn millis_to_datetime(millis: u64) -> DateTime<Utc> {
    let secs = (millis / 1000) as i64;
    let nanos = ((millis % 1000) * 1_000_000) as u32;
    Utc.timestamp_opt(secs, nanos)
        .single()
        .unwrap_or_default()
}

/// Production clock using real system time.
///
/// This is the default clock implementation used in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that ticks one millisecond per reading.
///
/// Every timestamp the ledger takes is distinct and increasing, so actions
/// created in one test keep their creation order. Jump across the cancel
/// grace window or a daily limit with [`advance_secs`](Self::advance_secs)
/// and [`advance_days`](Self::advance_days).
///
/// Share one clock between a ledger and its test through an `Arc`.
///
/// ```
/// use quorum::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// assert_eq!(clock.now_millis(), 1000);
/// assert_eq!(clock.now_millis(), 1001);
///
/// clock.advance_secs(61);
/// assert_eq!(clock.peek(), 63_002);
/// ```
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicU64,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    /// Advance the clock by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    /// Advance the clock by whole days.
    pub fn advance_days(&self, days: u64) {
        self.advance_secs(days * 24 * 60 * 60);
    }

    /// The next reading, without consuming it.
    pub fn peek(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.millis.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}
