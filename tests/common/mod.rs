#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use posture_companion_lib::clock::ManualClock;
use posture_companion_lib::companion::Companion;
use posture_companion_lib::config::BackendEndpoint;
use posture_companion_lib::ingest::SessionClient;
use posture_companion_lib::notifications::{HostShell, NotificationPayload};
use posture_companion_lib::persisted::PersistedState;
use posture_companion_lib::settings::SettingsStore;
use serde_json::Value;
use tempfile::TempDir;

pub const NECK_CRITICAL: &str = r#"{"severity_by_metric": {"neck_angle": "critical"}, "overall_severity": "critical"}"#;

#[derive(Default)]
pub struct TestHost {
    notifications: Mutex<Vec<NotificationPayload>>,
    events: Mutex<Vec<String>>,
}

impl TestHost {
    pub fn notifications(&self) -> Vec<NotificationPayload> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

impl HostShell for TestHost {
    fn notify(&self, payload: &NotificationPayload) -> anyhow::Result<()> {
        self.notifications.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn emit(&self, event: &str, _payload: Value) {
        self.events.lock().unwrap().push(event.to_string());
    }
}

pub struct Harness {
    pub companion: Companion,
    pub host: Arc<TestHost>,
    pub clock: ManualClock,
    pub dir: TempDir,
}

pub fn harness(port: u16, clock_at: &str, persisted: PersistedState) -> Harness {
    let dir = TempDir::new().unwrap();
    harness_in(dir, port, clock_at, persisted)
}

pub fn harness_in(dir: TempDir, port: u16, clock_at: &str, persisted: PersistedState) -> Harness {
    let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
    let host = Arc::new(TestHost::default());
    let clock = ManualClock::at(clock_at).unwrap();
    let companion = Companion::new(
        settings,
        persisted,
        SessionClient::new(BackendEndpoint::new("127.0.0.1", port)),
        host.clone(),
        Arc::new(clock.clone()),
    );
    Harness {
        companion,
        host,
        clock,
        dir,
    }
}

/// Poll `check` every 20ms for up to five seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..250 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
