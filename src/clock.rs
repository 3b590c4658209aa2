use chrono::{DateTime, Duration, FixedOffset, Local};
use std::sync::{Arc, Mutex};

/// Wall-clock source for every time-based decision (debounce, cooldown,
/// working hours, hourly buckets). Local offset is kept so working hours
/// compare against the user's time of day.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Convenience constructor from an RFC 3339 string.
    pub fn at(rfc3339: &str) -> anyhow::Result<Self> {
        let start = DateTime::parse_from_rfc3339(rfc3339)?;
        Ok(Self::new(start))
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn set(&self, to: DateTime<FixedOffset>) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }
}
