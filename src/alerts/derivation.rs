use uuid::Uuid;

use crate::analysis::{ErgonomicAnalysis, Metric};
use crate::persisted::PersistedState;

use super::models::{metric_copy, AlertKind, AlertSeverity, ErgonomicAlert, POSTURE_MESSAGE};

pub const METRIC_COOLDOWN_MS: i64 = 30_000;

/// Turns sustained non-good metric statuses into alert list entries, at
/// most one per metric per cooldown window.
#[derive(Debug, Clone)]
pub struct AlertDeriver {
    cooldown_ms: i64,
}

impl Default for AlertDeriver {
    fn default() -> Self {
        Self {
            cooldown_ms: METRIC_COOLDOWN_MS,
        }
    }
}

impl AlertDeriver {
    pub fn new(cooldown_ms: i64) -> Self {
        Self { cooldown_ms }
    }

    pub fn derive(
        &self,
        analysis: &ErgonomicAnalysis,
        now_ms: i64,
        persisted: &mut PersistedState,
    ) -> Vec<ErgonomicAlert> {
        let mut alerts = Vec::new();

        for metric in Metric::ALL {
            let status = analysis.statuses.get(metric);
            // A good reading leaves the cooldown clock alone.
            if status.is_good() {
                continue;
            }
            if persisted.metric_snoozed(metric, now_ms) {
                continue;
            }
            if let Some(last) = persisted.metric_last_fired(metric) {
                if now_ms - last < self.cooldown_ms {
                    continue;
                }
            }

            persisted.set_metric_last_fired(metric, now_ms);

            let (title, recommendation) = metric_copy(metric);
            alerts.push(ErgonomicAlert {
                id: format!("posture-{}-{}", metric.as_str(), Uuid::new_v4()),
                kind: AlertKind::Posture,
                title: title.to_string(),
                message: POSTURE_MESSAGE.to_string(),
                severity: AlertSeverity::from(status),
                recommendation: Some(recommendation.to_string()),
                created_at: now_ms,
                source: Some(metric),
            });
        }

        alerts
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
    fn critical_neck_alerts_once_per_window() {
        let deriver = AlertDeriver::default();
        let mut persisted = PersistedState::in_memory();
        let frame = analysis(r#"{"severity_by_metric": {"neck_angle": "critical"}}"#);

        let first = deriver.derive(&frame, 0, &mut persisted);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].source, Some(Metric::Neck));
        assert_eq!(first[0].severity, AlertSeverity::Critical);
        assert_eq!(first[0].kind, AlertKind::Posture);

        for second in 1..=29 {
            let again = deriver.derive(&frame, second * 1_000, &mut persisted);
            assert!(again.is_empty(), "unexpected alert at {second}s");
        }

        let after = deriver.derive(&frame, 30_000, &mut persisted);
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn recovery_does_not_reset_cooldown() {
        let deriver = AlertDeriver::default();
        let mut persisted = PersistedState::in_memory();
        let bad = analysis(r#"{"severity_by_metric": {"back_angle": "warning"}}"#);
        let good = analysis("{}");

        assert_eq!(deriver.derive(&bad, 0, &mut persisted).len(), 1);
        assert!(deriver.derive(&good, 5_000, &mut persisted).is_empty());
        assert!(deriver.derive(&bad, 10_000, &mut persisted).is_empty());
        assert_eq!(persisted.metric_last_fired(Metric::Back), Some(0));
    }

    #[test]
    fn metrics_debounce_independently() {
        let deriver = AlertDeriver::default();
        let mut persisted = PersistedState::in_memory();
        let neck = analysis(r#"{"severity_by_metric": {"neck_angle": "warning"}}"#);
        let all = analysis(
            r#"{"severity_by_metric": {"neck_angle": "warning", "back_angle": "critical", "elbow_angle": "warning"}}"#,
        );

        assert_eq!(deriver.derive(&neck, 0, &mut persisted).len(), 1);
        let next = deriver.derive(&all, 1_000, &mut persisted);
        let sources: Vec<_> = next.iter().filter_map(|a| a.source).collect();
        assert_eq!(sources, vec![Metric::Back, Metric::Arms]);
    }

    #[test]
    fn snoozed_metric_is_skipped() {
        let deriver = AlertDeriver::default();
        let mut persisted = PersistedState::in_memory();
        persisted.snooze_metric(Metric::Neck, 60_000);
        let frame = analysis(r#"{"severity_by_metric": {"neck_angle": "critical"}}"#);

        assert!(deriver.derive(&frame, 59_999, &mut persisted).is_empty());
        assert_eq!(deriver.derive(&frame, 60_000, &mut persisted).len(), 1);
    }
}
