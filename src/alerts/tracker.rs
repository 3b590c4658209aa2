use std::collections::HashMap;

use crate::analysis::{ErgonomicAnalysis, Metric};

use super::models::{metric_copy, AlertSeverity, PostureAlert, PostureAlertType, POSTURE_MESSAGE};

/// Measures how long each metric has stayed out of `good` and reports the
/// ongoing streaks as [`PostureAlert`]s.
#[derive(Debug, Default)]
pub struct PostureTracker {
    bad_since: HashMap<Metric, i64>,
}

impl PostureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, analysis: &ErgonomicAnalysis, now_ms: i64) -> Vec<PostureAlert> {
        let mut alerts = Vec::new();

        for metric in Metric::ALL {
            let status = analysis.statuses.get(metric);
            if status.is_good() {
                self.bad_since.remove(&metric);
                continue;
            }

            let since = *self.bad_since.entry(metric).or_insert(now_ms);
            let (_, recommendation) = metric_copy(metric);
            alerts.push(PostureAlert {
                alert_type: PostureAlertType::for_metric(metric),
                severity: AlertSeverity::from(status),
                duration: ((now_ms - since).max(0) / 1_000) as u64,
                message: POSTURE_MESSAGE.to_string(),
                recommendation: recommendation.to_string(),
                dismissible: true,
            });
        }

        alerts
    }

    pub fn reset(&mut self) {
        self.bad_since.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisFrame;

    fn analysis(json: &str) -> ErgonomicAnalysis {
        AnalysisFrame::parse(json).unwrap().into_analysis(0)
    }

    #[test]
    fn duration_grows_while_bad_and_resets_on_recovery() {
        let mut tracker = PostureTracker::new();
        let bad = analysis(r#"{"severity_by_metric": {"neck_angle": "warning"}}"#);

        assert_eq!(tracker.observe(&bad, 10_000)[0].duration, 0);
        let later = tracker.observe(&bad, 75_500);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].duration, 65);
        assert_eq!(later[0].alert_type, PostureAlertType::NeckForward);

        assert!(tracker.observe(&analysis("{}"), 80_000).is_empty());
        assert_eq!(tracker.observe(&bad, 90_000)[0].duration, 0);
    }

    #[test]
    fn severity_follows_current_status() {
        let mut tracker = PostureTracker::new();
        tracker.observe(&analysis(r#"{"severity_by_metric": {"elbow_angle": "warning"}}"#), 0);
        let alerts = tracker.observe(
            &analysis(r#"{"severity_by_metric": {"elbow_angle": "critical"}}"#),
            5_000,
        );
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].alert_type, PostureAlertType::PoorArmPosition);
        assert_eq!(alerts[0].duration, 5);
    }
}
