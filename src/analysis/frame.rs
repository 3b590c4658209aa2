use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::severity::{normalize, overall_score, status_of};
use super::types::{ErgonomicAnalysis, LandmarkPoint, Landmarks, Scores, Statuses};

/// Raw severities as received. Every field is optional; non-string values
/// are treated as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisFrame {
    pub landmarks: Option<Landmarks>,
    pub neck_angle: Option<String>,
    pub back_angle: Option<String>,
    pub elbow_angle: Option<String>,
    pub overall_severity: Option<String>,
}

impl AnalysisFrame {
    /// Parse one text message from the analysis stream.
    ///
    /// Fails only when the text is not JSON or not a JSON object. Missing or
    /// oddly-typed fields never fail the frame.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("frame is not valid JSON")?;
        let Value::Object(map) = value else {
            bail!("frame is not a JSON object");
        };

        let severities = map.get("severity_by_metric").and_then(Value::as_object);
        let severity = |name: &str| {
            severities
                .and_then(|s| s.get(name))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        Ok(Self {
            landmarks: map.get("landmarks").and_then(parse_landmarks),
            neck_angle: severity("neck_angle"),
            back_angle: severity("back_angle"),
            elbow_angle: severity("elbow_angle"),
            overall_severity: map
                .get("overall_severity")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    /// Normalise into the snapshot the store holds.
    ///
    /// The overall score averages the metric scores while the overall
    /// status comes from the frame's own `overall_severity`.
    pub fn into_analysis(self, timestamp: i64) -> ErgonomicAnalysis {
        let (neck_score, neck) = normalize(self.neck_angle.as_deref());
        let (back_score, back) = normalize(self.back_angle.as_deref());
        let (arms_score, arms) = normalize(self.elbow_angle.as_deref());

        ErgonomicAnalysis {
            timestamp,
            landmarks: self.landmarks,
            scores: Scores {
                neck: neck_score,
                back: back_score,
                arms: arms_score,
                overall: overall_score(neck_score, back_score, arms_score),
            },
            statuses: Statuses {
                neck,
                back,
                arms,
                overall: status_of(self.overall_severity.as_deref()),
            },
        }
    }
}

/// Accepts either a bare array of points or `{ "points": [...] }`.
/// Any point without numeric `x`/`y` drops the landmarks for the frame.
fn parse_landmarks(value: &Value) -> Option<Landmarks> {
    let points = match value {
        Value::Array(points) => points,
        Value::Object(obj) => obj.get("points")?.as_array()?,
        _ => return None,
    };

    points
        .iter()
        .map(|p| {
            Some(LandmarkPoint {
                x: p.get("x")?.as_f64()?,
                y: p.get("y")?.as_f64()?,
                z: p.get("z").and_then(Value::as_f64),
                visibility: p.get("visibility").and_then(Value::as_f64),
            })
        })
        .collect::<Option<Vec<_>>>()
        .map(|points| Landmarks { points })
}
