use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A point in simulated time, in seconds.
///
/// This instant is guaranteed to be:
///  - non-negative
///  - finite and non-NaN
#[derive(Serialize, Deserialize, Clone, Debug, Copy, Default, PartialEq, PartialOrd)]
pub struct SimInstant(f64);

impl SimInstant {
    /// Returns `None` for negative or non-finite values.
    pub fn from_secs_f64(value: f64) -> Option<Self> {
        (value >= 0.0 && value.is_finite()).then_some(Self(value))
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0
    }

    /// Get the duration between this instant and an earlier one. Saturates at
    /// zero if `other` is later.
    pub fn duration_since(&self, other: &Self) -> f64 {
        if self.0 < other.0 {
            return 0.0;
        }
        self.0 - other.0
    }
}

impl std::ops::Add<f64> for SimInstant {
    type Output = Self;

    /// Negative or non-finite increments leave the instant unchanged.
    fn add(self, rhs: f64) -> Self::Output {
        if rhs >= 0.0 && rhs.is_finite() {
            Self(self.0 + rhs)
        } else {
            self
        }
    }
}

impl std::ops::AddAssign<f64> for SimInstant {
    fn add_assign(&mut self, rhs: f64) {
        *self = *self + rhs;
    }
}

impl std::ops::Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self + rhs.as_secs_f64()
    }
}

/// Source of the wall-clock time the simulator stamps its first frame with.
///
/// The simulator reads the clock once, at construction. All
/// later timestamps are derived from the integrated time so that replays are
/// reproducible.
pub trait Clock {
    fn now(&self) -> SimInstant;
}

/// A clock that always returns the instant it was created with.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(SimInstant);

impl FixedClock {
    pub fn new(start: SimInstant) -> Self {
        Self(start)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> SimInstant {
        self.0
    }
}

/// Seconds since the unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SimInstant {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        SimInstant(secs)
    }
}
