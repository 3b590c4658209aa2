use serde::{Deserialize, Serialize};

use crate::alerts::ErgonomicAlert;
use crate::analysis::ErgonomicAnalysis;
use crate::persisted::PersistedState;
use crate::settings::{SettingsPatch, UserSettings};

pub const MAX_ALERTS: usize = 50;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CameraStatus {
    #[default]
    Idle,
    Starting,
    Active,
    Error,
}

/// The single place companion state is mutated. Reads hand out clones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErgonomicStore {
    pub is_monitoring: bool,
    pub is_minimized: bool,
    pub current_analysis: Option<ErgonomicAnalysis>,
    pub camera_status: CameraStatus,
    /// Newest first, at most [`MAX_ALERTS`].
    pub alerts: Vec<ErgonomicAlert>,
    pub settings: UserSettings,
}

impl ErgonomicStore {
    pub fn new(settings: UserSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> ErgonomicStore {
        self.clone()
    }

    pub fn start_monitoring(&mut self) {
        self.is_monitoring = true;
    }

    pub fn stop_monitoring(&mut self) {
        self.is_monitoring = false;
    }

    pub fn toggle_minimized(&mut self) -> bool {
        self.is_minimized = !self.is_minimized;
        self.is_minimized
    }

    /// Full replace, never a merge.
    pub fn update_analysis(&mut self, analysis: ErgonomicAnalysis) {
        self.current_analysis = Some(analysis);
    }

    pub fn push_alert(&mut self, alert: ErgonomicAlert) {
        self.alerts.insert(0, alert);
        self.alerts.truncate(MAX_ALERTS);
    }

    pub fn dismiss_alert(&mut self, id: &str) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Remove the alert now and remember when it may come back. The
    /// alert's source metric stays quiet for the same span.
    pub fn snooze_alert(
        &mut self,
        id: &str,
        minutes: u32,
        now_ms: i64,
        persisted: &mut PersistedState,
    ) -> bool {
        let Some(pos) = self.alerts.iter().position(|a| a.id == id) else {
            return false;
        };
        let until = now_ms + i64::from(minutes) * 60_000;
        persisted.snooze_alert(id, until);
        let alert = self.alerts.remove(pos);
        if let Some(metric) = alert.source {
            persisted.snooze_metric(metric, until);
        }
        true
    }

    pub fn set_camera_status(&mut self, status: CameraStatus) {
        self.camera_status = status;
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.merge(patch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertKind, AlertSeverity};
    use crate::analysis::{AnalysisFrame, Metric};
    use crate::settings::Theme;

    fn alert(id: &str, source: Option<Metric>) -> ErgonomicAlert {
        ErgonomicAlert {
            id: id.into(),
            kind: AlertKind::Posture,
            title: "t".into(),
            message: "m".into(),
            severity: AlertSeverity::Warning,
            recommendation: None,
            created_at: 0,
            source,
        }
    }

    #[test]
    fn alert_list_is_capped_newest_first() {
        let mut store = ErgonomicStore::default();
        for i in 0..120 {
            store.push_alert(alert(&i.to_string(), None));
        }
        assert_eq!(store.alerts.len(), MAX_ALERTS);
        assert_eq!(store.alerts[0].id, "119");
        assert_eq!(store.alerts[MAX_ALERTS - 1].id, "70");
    }

    #[test]
    fn dismiss_unknown_id_is_noop() {
        let mut store = ErgonomicStore::default();
        store.push_alert(alert("a", None));
        assert!(!store.dismiss_alert("b"));
        assert!(store.dismiss_alert("a"));
        assert!(store.alerts.is_empty());
    }

    #[test]
    fn snooze_removes_and_quiets_source_metric() {
        let mut store = ErgonomicStore::default();
        let mut persisted = PersistedState::in_memory();
        store.push_alert(alert("neck-1", Some(Metric::Neck)));

        assert!(store.snooze_alert("neck-1", 5, 1_000, &mut persisted));
        assert!(store.alerts.is_empty());
        assert_eq!(persisted.alert_snoozed_until("neck-1"), Some(301_000));
        assert!(persisted.metric_snoozed(Metric::Neck, 300_999));
        assert!(!persisted.metric_snoozed(Metric::Neck, 301_000));
    }

    #[test]
    fn fresh_state_defaults_to_idle_and_good() {
        let store = ErgonomicStore::default();
        assert_eq!(store.camera_status, CameraStatus::Idle);
        assert_eq!(crate::analysis::Status::default(), crate::analysis::Status::Good);
        assert_eq!(crate::ingest::ChannelState::default(), crate::ingest::ChannelState::Idle);
    }

    #[test]
    fn snoozing_unknown_alert_persists_nothing() {
        let mut store = ErgonomicStore::default();
        let mut persisted = PersistedState::in_memory();
        store.push_alert(alert("neck-1", Some(Metric::Neck)));

        assert!(!store.snooze_alert("ghost", 5, 1_000, &mut persisted));
        assert_eq!(persisted.alert_snoozed_until("ghost"), None);
        assert!(!persisted.metric_snoozed(Metric::Neck, 2_000));
        assert_eq!(store.alerts.len(), 1);
    }

    #[test]
    fn minimize_leaves_monitoring_and_analysis_alone() {
        let mut store = ErgonomicStore::default();
        store.start_monitoring();
        let analysis = AnalysisFrame::parse("{}").unwrap().into_analysis(7);
        store.update_analysis(analysis.clone());

        assert!(store.toggle_minimized());
        assert!(!store.toggle_minimized());
        assert!(store.is_monitoring);
        assert_eq!(store.current_analysis, Some(analysis));
    }

    #[test]
    fn analysis_is_replaced_not_merged() {
        let mut store = ErgonomicStore::default();
        let with_landmarks = AnalysisFrame::parse(r#"{"landmarks": [{"x": 1, "y": 1}]}"#)
            .unwrap()
            .into_analysis(1);
        store.update_analysis(with_landmarks);
        store.update_analysis(AnalysisFrame::parse("{}").unwrap().into_analysis(2));

        let current = store.current_analysis.unwrap();
        assert_eq!(current.timestamp, 2);
        assert!(current.landmarks.is_none());
    }

    #[test]
    fn settings_merge_in_place() {
        let mut store = ErgonomicStore::default();
        store.update_settings(SettingsPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        });
        assert_eq!(store.settings.theme, Theme::Light);
        store.set_camera_status(CameraStatus::Active);
        assert_eq!(store.camera_status, CameraStatus::Active);
    }
}
