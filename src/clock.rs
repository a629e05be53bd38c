//! Time source for expiry checks.
//!
//! Expiry is decided at whole-second granularity because license timestamps
//! carry no fractional part.

use chrono::{DateTime, SubsecRound, Utc};

/// Where validation reads "now" from.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current UTC time truncated to whole seconds.
    fn now_utc_seconds(&self) -> DateTime<Utc> {
        self.now_utc().trunc_subsecs(0)
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a fixed instant.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone, Copy)]
pub struct MockClock(DateTime<Utc>);

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
