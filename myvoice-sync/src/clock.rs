//! Time source for the sync cursor.

use chrono::{DateTime, Utc};

/// Supplies "now". Injected so staleness can be tested without sleeping.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
