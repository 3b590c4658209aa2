//! Best-effort durable state behind namespaced string keys.
//!
//! Everything stored here may be lost without corrupting behaviour: a lost
//! debounce clock means one early alert, a lost counter one extra
//! notification.

mod memory;
mod sqlite;

use chrono::{DateTime, FixedOffset};

use crate::analysis::Metric;

pub use memory::MemoryStore;
pub use sqlite::SqliteKeyValueStore;

const DEBOUNCE_PREFIX: &str = "erg-alert:";
const COUNT_PREFIX: &str = "notif-count:";
const ALERT_SNOOZE_PREFIX: &str = "alert-snooze:";
const METRIC_SNOOZE_PREFIX: &str = "metric-snooze:";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// Calendar-hour bucket used by the hourly notification counters.
pub fn hour_bucket(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%dT%H").to_string()
}

/// Typed accessors over a [`KeyValueStore`].
pub struct PersistedState {
    store: Box<dyn KeyValueStore>,
    pruned_bucket: Option<String>,
}

impl PersistedState {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            pruned_bucket: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.store.get(key).and_then(|raw| raw.parse().ok())
    }

    pub fn metric_last_fired(&self, metric: Metric) -> Option<i64> {
        self.get_i64(&format!("{DEBOUNCE_PREFIX}{}", metric.as_str()))
    }

    pub fn set_metric_last_fired(&mut self, metric: Metric, at_ms: i64) {
        self.store
            .set(&format!("{DEBOUNCE_PREFIX}{}", metric.as_str()), at_ms.to_string());
    }

    pub fn hourly_count(&self, key: &str, now: &DateTime<FixedOffset>) -> u32 {
        self.store
            .get(&count_key(key, now))
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Bump the counter for `key` in the current hour and return the new value.
    pub fn increment_hourly_count(&mut self, key: &str, now: &DateTime<FixedOffset>) -> u32 {
        let next = self.hourly_count(key, now).saturating_add(1);
        self.store.set(&count_key(key, now), next.to_string());
        next
    }

    pub fn snooze_alert(&mut self, alert_id: &str, until_ms: i64) {
        self.store
            .set(&format!("{ALERT_SNOOZE_PREFIX}{alert_id}"), until_ms.to_string());
    }

    pub fn alert_snoozed_until(&self, alert_id: &str) -> Option<i64> {
        self.get_i64(&format!("{ALERT_SNOOZE_PREFIX}{alert_id}"))
    }

    pub fn snooze_metric(&mut self, metric: Metric, until_ms: i64) {
        self.store.set(
            &format!("{METRIC_SNOOZE_PREFIX}{}", metric.as_str()),
            until_ms.to_string(),
        );
    }

    pub fn metric_snoozed(&self, metric: Metric, now_ms: i64) -> bool {
        self.get_i64(&format!("{METRIC_SNOOZE_PREFIX}{}", metric.as_str()))
            .map(|until| now_ms < until)
            .unwrap_or(false)
    }

    /// Drop counters from earlier hours and snoozes that already ended.
    pub fn prune(&mut self, now: &DateTime<FixedOffset>) -> usize {
        let bucket = hour_bucket(now);
        let now_ms = now.timestamp_millis();
        let stale: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|key| {
                if let Some(rest) = key.strip_prefix(COUNT_PREFIX) {
                    !rest.ends_with(&bucket)
                } else if key.starts_with(ALERT_SNOOZE_PREFIX)
                    || key.starts_with(METRIC_SNOOZE_PREFIX)
                {
                    self.get_i64(key).map(|until| until <= now_ms).unwrap_or(true)
                } else {
                    false
                }
            })
            .collect();

        for key in &stale {
            self.store.remove(key);
        }
        stale.len()
    }

    /// Prune once per calendar hour. Cheap to call on every event.
    pub fn prune_if_new_hour(&mut self, now: &DateTime<FixedOffset>) -> usize {
        let bucket = hour_bucket(now);
        if self.pruned_bucket.as_deref() == Some(bucket.as_str()) {
            return 0;
        }
        self.pruned_bucket = Some(bucket);
        self.prune(now)
    }
}

fn count_key(key: &str, now: &DateTime<FixedOffset>) -> String {
    format!("{COUNT_PREFIX}{key}:{}", hour_bucket(now))
}
