mod common;

use posture_companion_lib::alerts::AlertSeverity;
use posture_companion_lib::db::Database;
use posture_companion_lib::persisted::{PersistedState, SqliteKeyValueStore};
use tempfile::TempDir;

use common::{harness, harness_in, NECK_CRITICAL};

const NECK_WARNING: &str = r#"{"severity_by_metric": {"neck_angle": "warning"}}"#;

async fn sqlite_state(db: &Database) -> PersistedState {
    let kv = SqliteKeyValueStore::open(db.clone()).await.unwrap();
    PersistedState::new(Box::new(kv))
}

#[tokio::test]
async fn debounce_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("state.sqlite3");

    {
        let db = Database::new(db_path.clone()).unwrap();
        let h = harness(9, "2026-10-14T10:00:00+00:00", sqlite_state(&db).await);
        assert!(h.companion.ingest_frame(NECK_CRITICAL));
        assert_eq!(h.companion.snapshot().alerts.len(), 1);
        db.flush().await.unwrap();
    }

    let db = Database::new(db_path).unwrap();
    let h = harness_in(
        dir,
        9,
        "2026-10-14T10:00:10+00:00",
        sqlite_state(&db).await,
    );
    assert!(h.companion.ingest_frame(NECK_CRITICAL));
    assert!(h.companion.snapshot().alerts.is_empty());

    h.clock.advance_secs(20);
    assert!(h.companion.ingest_frame(NECK_CRITICAL));
    assert_eq!(h.companion.snapshot().alerts.len(), 1);
}

#[tokio::test]
async fn outside_working_hours_only_the_alert_list_moves() {
    let h = harness(9, "2026-10-14T23:30:00+00:00", PersistedState::in_memory());

    for _ in 0..12 {
        h.companion.ingest_frame(NECK_CRITICAL);
        h.clock.advance_secs(30);
    }
    h.companion.ingest_frame(NECK_CRITICAL);

    assert_eq!(h.companion.snapshot().alerts.len(), 13);
    assert!(h.companion.toasts().is_empty());
    assert!(h.companion.visual_cue().is_none());
    assert!(h.host.notifications().is_empty());
}

#[tokio::test]
async fn five_minutes_of_critical_posture_reaches_the_system_tier() {
    let h = harness(9, "2026-10-14T10:00:00+00:00", PersistedState::in_memory());

    for _ in 0..20 {
        h.companion.ingest_frame(NECK_CRITICAL);
        h.clock.advance_secs(15);
    }
    h.companion.ingest_frame(NECK_CRITICAL);

    let notifications = h.host.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].severity, AlertSeverity::Critical);
    assert!(h.host.count("visual-cue-changed") > 0);
}

#[tokio::test]
async fn warning_streak_never_notifies_the_system() {
    let h = harness(9, "2026-10-14T10:00:00+00:00", PersistedState::in_memory());

    for _ in 0..25 {
        h.companion.ingest_frame(NECK_WARNING);
        h.clock.advance_secs(15);
    }

    assert!(h.host.notifications().is_empty());
    let toasts = h.companion.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].id, "posture-neck_forward");
}
