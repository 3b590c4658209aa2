use serde::{Deserialize, Serialize};

use crate::alerts::AlertSeverity;

/// Payload handed to the host shell for a native notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub severity: AlertSeverity,
}

impl NotificationPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>, urgent: bool) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: if urgent {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Info
            },
        }
    }

    pub fn urgency(&self) -> Urgency {
        Urgency::from(self.severity)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

impl From<AlertSeverity> for Urgency {
    fn from(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::Critical => Urgency::Critical,
            AlertSeverity::Warning => Urgency::Normal,
            AlertSeverity::Info => Urgency::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastType {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToastAction {
    pub label: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToastNotification {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub toast_type: ToastType,
    /// Milliseconds on screen before auto-removal (ignored when persistent).
    pub duration: u64,
    #[serde(default)]
    pub actions: Vec<ToastAction>,
    #[serde(default)]
    pub persistent: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisualCueType {
    BorderGlow,
    Pulse,
    Overlay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CueTarget {
    EntireApp,
    ScoreCard,
    VideoFeed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisualCue {
    #[serde(rename = "type")]
    pub cue_type: VisualCueType,
    /// 1 to 3; scales how long the cue stays up.
    pub intensity: u8,
    pub target: CueTarget,
    pub color: String,
}

/// What the engine actually pushed to a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    System(NotificationPayload),
    Toast(ToastNotification),
    Visual(VisualCue),
}
