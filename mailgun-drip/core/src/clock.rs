//! Wall-clock sources.

use chrono::{DateTime, Utc};

/// Source of "now" for delivery time computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    #[inline]
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self { Self(now) }
}

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> { self.0 }
}
