use super::types::Status;

pub const CRITICAL_SCORE: f64 = 3.0;
pub const WARNING_SCORE: f64 = 6.0;
pub const ACCEPTABLE_SCORE: f64 = 8.0;
pub const OPTIMAL_SCORE: f64 = 9.5;

/// Map a raw severity label to a 0-10 score and a status.
///
/// Total over every input: unknown labels and a missing label land on the
/// optimal branch.
pub fn normalize(raw: Option<&str>) -> (f64, Status) {
    match raw {
        Some("critical") => (CRITICAL_SCORE, Status::Critical),
        Some("warning") => (WARNING_SCORE, Status::Warning),
        Some("acceptable") => (ACCEPTABLE_SCORE, Status::Good),
        _ => (OPTIMAL_SCORE, Status::Good),
    }
}

/// Status only, used for the frame's own overall severity.
pub fn status_of(raw: Option<&str>) -> Status {
    normalize(raw).1
}

/// Mean of the three metric scores, rounded to one decimal.
pub fn overall_score(neck: f64, back: f64, arms: f64) -> f64 {
    (((neck + back + arms) / 3.0) * 10.0).round() / 10.0
}
