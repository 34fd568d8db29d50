//! Wall clock adapter

use chrono::{DateTime, Utc};
use slotbook_core::ports::Clock;

/// [`Clock`] backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
