//! Monotonic clocks.
//!
//! Context nodes record the moment they were created so that callers can
//! ask how long a logical unit of work has been alive. Timestamps are only
//! meaningful relative to the clock that produced them.

use serde::Serialize;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Opaque point in time produced by a [`Clock`].
///
/// Stored as nanoseconds since the clock's origin. Compare timestamps only
/// through [`Clock::difference`] or with timestamps of the same clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> u64 {
        self.0
    }
}

/// A source of monotonically non-decreasing timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> Timestamp;

    /// Returns the time elapsed since `since`.
    ///
    /// Saturates to zero if `since` lies in the future.
    fn difference(&self, since: Timestamp) -> Duration {
        Duration::from_nanos(self.now().0.saturating_sub(since.0))
    }
}

/// Wall-independent clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    /// Instant mapped to `Timestamp(0)`.
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let nanos = self.origin.elapsed().as_nanos();
        Timestamp(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// A clock that only moves when told to.
///
/// Useful in tests that assert exact elapsed durations.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.nanos.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_reports_exact_difference() {
        let clock = ManualClock::new();
        let start = clock.now();

        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.difference(start), Duration::from_millis(5));

        clock.advance(Duration::from_nanos(1));
        assert_eq!(clock.difference(start), Duration::from_nanos(5_000_001));
    }

    #[test]
    fn difference_saturates_for_future_timestamps() {
        let clock = ManualClock::new();
        let later = Timestamp::from_nanos(1_000);

        assert_eq!(clock.difference(later), Duration::ZERO);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now();

        for _ in 0..1_000 {
            let now = clock.now();
            assert!(now >= previous);
            previous = now;
        }
    }
}
