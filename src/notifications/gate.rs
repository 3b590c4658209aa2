use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::persisted::PersistedState;
use crate::settings::NotificationSettings;

pub const KEY_COOLDOWN_MS: i64 = 15_000;
pub const HOURLY_CAP: u32 = 20;

/// Signals about the user's situation that the gate consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationContext {
    pub in_meeting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Disabled,
    OutsideWorkingHours,
    DoNotDisturb,
    CoolingDown,
    RateLimited,
}

impl GateDecision {
    pub fn allowed(self) -> bool {
        self == GateDecision::Allow
    }
}

/// Decides whether a notification key may interrupt the user right now.
///
/// Per-key "last shown" lives here; hourly counters live in
/// [`PersistedState`].
#[derive(Debug)]
pub struct NotificationGate {
    last_shown: HashMap<String, i64>,
    cooldown_ms: i64,
    hourly_cap: u32,
}

impl Default for NotificationGate {
    fn default() -> Self {
        Self::new(KEY_COOLDOWN_MS, HOURLY_CAP)
    }
}

impl NotificationGate {
    pub fn new(cooldown_ms: i64, hourly_cap: u32) -> Self {
        Self {
            last_shown: HashMap::new(),
            cooldown_ms,
            hourly_cap,
        }
    }

    /// Conditions are checked in order and the first failure is reported.
    /// The rate limit is checked last, and checking it consumes one unit.
    pub fn evaluate(
        &self,
        key: &str,
        settings: &NotificationSettings,
        context: &NotificationContext,
        now: &DateTime<FixedOffset>,
        persisted: &mut PersistedState,
    ) -> GateDecision {
        if !settings.enabled {
            return GateDecision::Disabled;
        }
        if !settings.working_hours.contains(now.time()) {
            return GateDecision::OutsideWorkingHours;
        }
        if settings.dnd_during_meetings && context.in_meeting {
            return GateDecision::DoNotDisturb;
        }

        let now_ms = now.timestamp_millis();
        let last = self.last_shown.get(key).copied().unwrap_or(0);
        if now_ms - last < self.cooldown_ms {
            return GateDecision::CoolingDown;
        }

        if !self.try_consume(key, now, persisted) {
            return GateDecision::RateLimited;
        }

        GateDecision::Allow
    }

    pub fn should_show(
        &self,
        key: &str,
        settings: &NotificationSettings,
        context: &NotificationContext,
        now: &DateTime<FixedOffset>,
        persisted: &mut PersistedState,
    ) -> bool {
        self.evaluate(key, settings, context, now, persisted).allowed()
    }

    /// Count one use of `key` in the current calendar hour and report whether
    /// the count is still within the cap.
    pub fn try_consume(
        &self,
        key: &str,
        now: &DateTime<FixedOffset>,
        persisted: &mut PersistedState,
    ) -> bool {
        persisted.increment_hourly_count(key, now) <= self.hourly_cap
    }

    pub fn mark_shown(&mut self, key: &str, now_ms: i64) {
        self.last_shown.insert(key.to_string(), now_ms);
    }
}
