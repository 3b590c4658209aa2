use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Good,
    Warning,
    Critical,
}

impl Status {
    pub fn is_good(self) -> bool {
        self == Status::Good
    }
}

/// The three body metrics reported by the analysis service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Neck,
    Back,
    Arms,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Neck, Metric::Back, Metric::Arms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Neck => "neck",
            Metric::Back => "back",
            Metric::Arms => "arms",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
    pub neck: f64,
    pub back: f64,
    pub arms: f64,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statuses {
    pub neck: Status,
    pub back: Status,
    pub arms: Status,
    pub overall: Status,
}

impl Statuses {
    pub fn get(&self, metric: Metric) -> Status {
        match metric {
            Metric::Neck => self.neck,
            Metric::Back => self.back,
            Metric::Arms => self.arms,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Landmarks {
    pub points: Vec<LandmarkPoint>,
}

/// One normalised posture snapshot. Replaced whole on every valid frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErgonomicAnalysis {
    /// Unix millis at receipt.
    pub timestamp: i64,
    pub landmarks: Option<Landmarks>,
    pub scores: Scores,
    pub statuses: Statuses,
}
