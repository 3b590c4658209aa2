use serde::{Deserialize, Serialize};

use crate::analysis::{Metric, Status};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Posture,
    Workspace,
    Break,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl From<Status> for AlertSeverity {
    fn from(status: Status) -> Self {
        match status {
            Status::Good => AlertSeverity::Info,
            Status::Warning => AlertSeverity::Warning,
            Status::Critical => AlertSeverity::Critical,
        }
    }
}

/// Entry of the user-facing alert list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErgonomicAlert {
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub recommendation: Option<String>,
    /// Unix millis.
    pub created_at: i64,
    /// Metric that produced the alert, if any. Snoozing the alert also
    /// snoozes this metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Metric>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PostureAlertType {
    NeckForward,
    HunchedBack,
    RaisedShoulders,
    PoorArmPosition,
}

impl PostureAlertType {
    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::Neck => PostureAlertType::NeckForward,
            Metric::Back => PostureAlertType::HunchedBack,
            Metric::Arms => PostureAlertType::PoorArmPosition,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostureAlertType::NeckForward => "neck_forward",
            PostureAlertType::HunchedBack => "hunched_back",
            PostureAlertType::RaisedShoulders => "raised_shoulders",
            PostureAlertType::PoorArmPosition => "poor_arm_position",
        }
    }
}

/// Input to the notification engine describing an ongoing bad posture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostureAlert {
    #[serde(rename = "type")]
    pub alert_type: PostureAlertType,
    pub severity: AlertSeverity,
    /// Seconds spent in the bad posture so far.
    pub duration: u64,
    pub message: String,
    pub recommendation: String,
    pub dismissible: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    Micro,
    Stretch,
    Rest,
}

impl BreakType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakType::Micro => "micro",
            BreakType::Stretch => "stretch",
            BreakType::Rest => "rest",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakReminder {
    #[serde(rename = "type")]
    pub break_type: BreakType,
    /// Minutes worked.
    pub time_worked: u32,
    /// Minutes.
    pub suggested_duration: u32,
    pub exercises: Vec<String>,
    pub snooze_options: Vec<u32>,
}

/// Fixed user-facing copy per metric: (title, recommendation).
pub fn metric_copy(metric: Metric) -> (&'static str, &'static str) {
    match metric {
        Metric::Neck => (
            "Neck pushed forward",
            "Raise your monitor to eye level.",
        ),
        Metric::Back => (
            "Hunched back",
            "Support your lower back and recline to 95-110 degrees.",
        ),
        Metric::Arms => (
            "Arms under strain",
            "Relax your shoulders and bring the mouse closer.",
        ),
    }
}

pub const POSTURE_MESSAGE: &str =
    "Suboptimal posture detected. Adjust your position to avoid fatigue.";
