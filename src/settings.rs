use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPreference {
    Visual,
    Audio,
    Both,
}

/// `HH:MM` bounds, both inclusive at minute granularity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

impl WorkingHours {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Unparseable bounds never match.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let (Some(start), Some(end)) = (minute_of_day(&self.start), minute_of_day(&self.end))
        else {
            return false;
        };
        let now = minute_of_time(time);
        now >= start && now <= end
    }
}

fn minute_of_day(raw: &str) -> Option<u32> {
    let (h, m) = raw.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

fn minute_of_time(time: NaiveTime) -> u32 {
    use chrono::Timelike;
    time.hour() * 60 + time.minute()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub working_hours: WorkingHours,
    pub dnd_during_meetings: bool,
    pub alert_sensitivity: Sensitivity,
    pub preferred_delivery: DeliveryPreference,
    /// Minutes of monitoring between break reminders; 0 disables them.
    pub break_reminder_interval: u32,
    /// Snooze choices offered to the user, in minutes.
    pub snooze_options: Vec<u32>,
    pub custom_messages: HashMap<String, String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            working_hours: WorkingHours::new("07:00", "22:00"),
            dnd_during_meetings: false,
            alert_sensitivity: Sensitivity::Medium,
            preferred_delivery: DeliveryPreference::Both,
            break_reminder_interval: 50,
            snooze_options: vec![5, 10, 15],
            custom_messages: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub theme: Theme,
    pub show_skeleton: bool,
    pub high_contrast: bool,
    pub alert_sensitivity: Sensitivity,
    pub auto_start_monitoring: bool,
    pub notifications: NotificationSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            show_skeleton: true,
            high_contrast: false,
            alert_sensitivity: Sensitivity::Medium,
            auto_start_monitoring: false,
            notifications: NotificationSettings::default(),
        }
    }
}

/// Shallow partial update: each present field replaces the stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub show_skeleton: Option<bool>,
    pub high_contrast: Option<bool>,
    pub alert_sensitivity: Option<Sensitivity>,
    pub auto_start_monitoring: Option<bool>,
    pub notifications: Option<NotificationSettings>,
}

impl UserSettings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(show_skeleton) = patch.show_skeleton {
            self.show_skeleton = show_skeleton;
        }
        if let Some(high_contrast) = patch.high_contrast {
            self.high_contrast = high_contrast;
        }
        if let Some(alert_sensitivity) = patch.alert_sensitivity {
            self.alert_sensitivity = alert_sensitivity;
        }
        if let Some(auto_start) = patch.auto_start_monitoring {
            self.auto_start_monitoring = auto_start;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> UserSettings {
        self.data
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Merge and persist; returns the merged settings.
    pub fn update(&self, patch: SettingsPatch) -> Result<UserSettings> {
        let mut guard = self.data.write().unwrap_or_else(|p| p.into_inner());
        guard.merge(patch);
        self.persist(&guard)?;
        Ok(guard.clone())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
