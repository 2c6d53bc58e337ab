//! Wall-clock timestamps that never go backwards.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Issues RFC 3339 timestamps (millisecond precision) that are
/// non-decreasing across calls, even if the system clock steps back.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_millis: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.observe(Utc::now())
    }

    pub fn now_rfc3339(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn observe(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let millis = wall.timestamp_millis();
        let prev = self.last_millis.fetch_max(millis, Ordering::SeqCst);
        if prev > millis {
            DateTime::from_timestamp_millis(prev).unwrap_or(wall)
        } else {
            wall
        }
    }
}
