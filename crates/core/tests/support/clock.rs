use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use slotbook_core::Clock;

/// Clock frozen at a settable instant.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Parse an RFC 3339 timestamp, e.g. `2025-03-19T12:00:00Z`.
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
        Self { now: Arc::new(Mutex::new(now)) }
    }

    pub fn set(&self, rfc3339: &str) {
        *self.now.lock().unwrap() =
            DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
