use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use tokio::{sync::watch, task::JoinHandle, time};
use uuid::Uuid;

use crate::alerts::{
    AlertDeriver, AlertKind, AlertSeverity, BreakReminder, BreakType, ErgonomicAlert,
    PostureTracker,
};
use crate::analysis::AnalysisFrame;
use crate::clock::Clock;
use crate::ingest::{ChannelState, FrameSink, IngestController, SessionClient};
use crate::notifications::engine::VISUAL_TIER_SECS;
use crate::notifications::{HostShell, NotificationEngine, ToastNotification, VisualCue};
use crate::persisted::PersistedState;
use crate::settings::{SettingsPatch, SettingsStore, UserSettings};
use crate::store::{CameraStatus, ErgonomicStore};

pub const BREAK_SUGGESTED_MINUTES: u32 = 5;
const STRETCHES: [&str; 3] = [
    "Roll your shoulders back ten times",
    "Tilt your head slowly to each side",
    "Stand up and stretch your arms overhead",
];

/// Everything a frame or user action mutates, behind one lock so events
/// are handled one at a time.
struct Core {
    store: ErgonomicStore,
    deriver: AlertDeriver,
    tracker: PostureTracker,
    engine: NotificationEngine,
    persisted: PersistedState,
}

/// Frame-to-notification path shared with the ingest task.
struct Pipeline {
    core: Mutex<Core>,
    clock: Arc<dyn Clock>,
    host: Arc<dyn HostShell>,
}

impl Pipeline {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn emit<T: Serialize + ?Sized>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.host.emit(event, value),
            Err(err) => warn!("Failed to serialize {event} payload: {err}"),
        }
    }

    fn ingest_frame(&self, text: &str) -> bool {
        let frame = match AnalysisFrame::parse(text) {
            Ok(frame) => frame,
            Err(err) => {
                debug!("Dropping malformed frame: {err:#}");
                return false;
            }
        };

        let now = self.clock.now();
        let now_ms = now.timestamp_millis();
        let analysis = frame.into_analysis(now_ms);

        let mut guard = self.lock();
        let core = &mut *guard;
        core.persisted.prune_if_new_hour(&now);

        core.store.update_analysis(analysis.clone());
        self.emit("analysis-updated", &analysis);

        let derived = core.deriver.derive(&analysis, now_ms, &mut core.persisted);
        if !derived.is_empty() {
            for alert in derived {
                core.store.push_alert(alert);
            }
            self.emit("alerts-changed", &core.store.alerts);
        }

        // Streaks below the lowest tier would only use up the hourly cap.
        for alert in core.tracker.observe(&analysis, now_ms) {
            if alert.duration < VISUAL_TIER_SECS {
                continue;
            }
            core.engine.process_posture_alert(
                &alert,
                &core.store.settings.notifications,
                &now,
                &mut core.persisted,
            );
        }

        true
    }

    fn offer_break(&self, time_worked: u32) {
        let now = self.clock.now();
        let mut guard = self.lock();
        let core = &mut *guard;
        core.persisted.prune_if_new_hour(&now);

        let reminder = BreakReminder {
            break_type: BreakType::Stretch,
            time_worked,
            suggested_duration: BREAK_SUGGESTED_MINUTES,
            exercises: STRETCHES.iter().map(|s| s.to_string()).collect(),
            snooze_options: core.store.settings.notifications.snooze_options.clone(),
        };

        let dispatch = core.engine.process_break_reminder(
            &reminder,
            &core.store.settings.notifications,
            &now,
            &mut core.persisted,
        );
        if !dispatch.decision.allowed() {
            return;
        }

        core.store.push_alert(ErgonomicAlert {
            id: format!("break-{}", Uuid::new_v4()),
            kind: AlertKind::Break,
            title: "Time for a break".into(),
            message: format!("You have been working for {time_worked} minutes."),
            severity: AlertSeverity::Info,
            recommendation: Some(reminder.exercises.join(". ")),
            created_at: now.timestamp_millis(),
            source: None,
        });
        self.emit("alerts-changed", &core.store.alerts);
    }
}

impl FrameSink for Pipeline {
    fn on_frame(&self, text: &str) -> bool {
        self.ingest_frame(text)
    }
}

/// Background work of one monitoring session.
struct Monitoring {
    ingest: IngestController,
    breaks: Option<JoinHandle<()>>,
    started: Option<time::Instant>,
}

impl Monitoring {
    fn stop_breaks(&mut self) {
        if let Some(handle) = self.breaks.take() {
            handle.abort();
        }
    }

    /// Re-arm the break ticker. Time worked counts from the session start,
    /// so a new interval keeps the ticks already earned.
    fn restart_breaks(&mut self, pipeline: Arc<Pipeline>, interval_minutes: u32) {
        self.stop_breaks();
        let Some(started) = self.started else {
            return;
        };
        if interval_minutes == 0 {
            return;
        }

        let period = Duration::from_secs(u64::from(interval_minutes) * 60);
        let elapsed_ticks = started.elapsed().as_secs() / period.as_secs();
        let first = started + period * (elapsed_ticks as u32 + 1);
        self.breaks = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(first, period);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let worked = (started.elapsed().as_secs() / 60) as u32;
                pipeline.offer_break(worked);
            }
        }));
    }
}

/// Owns the store, the notification engine and the background tasks that
/// feed them.
#[derive(Clone)]
pub struct Companion {
    pipeline: Arc<Pipeline>,
    settings: Arc<SettingsStore>,
    session: SessionClient,
    // Lock order: monitor, then the pipeline core.
    monitor: Arc<tokio::sync::Mutex<Monitoring>>,
}

impl Companion {
    pub fn new(
        settings: SettingsStore,
        mut persisted: PersistedState,
        session: SessionClient,
        host: Arc<dyn HostShell>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pruned = persisted.prune_if_new_hour(&clock.now());
        if pruned > 0 {
            info!("Pruned {pruned} stale persisted entries");
        }

        let core = Core {
            store: ErgonomicStore::new(settings.snapshot()),
            deriver: AlertDeriver::default(),
            tracker: PostureTracker::new(),
            engine: NotificationEngine::new(host.clone()),
            persisted,
        };

        Self {
            pipeline: Arc::new(Pipeline {
                core: Mutex::new(core),
                clock,
                host,
            }),
            settings: Arc::new(settings),
            session,
            monitor: Arc::new(tokio::sync::Mutex::new(Monitoring {
                ingest: IngestController::new(),
                breaks: None,
                started: None,
            })),
        }
    }

    /// Parse one frame and run it through the store, derivation and the
    /// engine. Returns `false` when the frame was dropped.
    pub fn ingest_frame(&self, text: &str) -> bool {
        self.pipeline.ingest_frame(text)
    }

    /// Start the session, the stream and the break ticker. The whole
    /// sequence runs under the monitor lock, and `monitoring-changed` is
    /// emitted once everything is running.
    pub async fn start_monitoring(&self) -> Result<()> {
        let mut monitor = self.monitor.lock().await;
        let interval = {
            let mut core = self.pipeline.lock();
            if core.store.is_monitoring {
                info!("Monitoring already active");
                return Ok(());
            }
            core.store.start_monitoring();
            core.store.settings.notifications.break_reminder_interval
        };

        self.session.start_session_detached();
        let sink: Arc<dyn FrameSink> = self.pipeline.clone();
        if let Err(err) = monitor
            .ingest
            .start(self.session.endpoint().stream_url(), sink)
            .await
        {
            self.pipeline.lock().store.stop_monitoring();
            self.session.stop_session().await;
            return Err(err);
        }
        monitor.started = Some(time::Instant::now());
        monitor.restart_breaks(self.pipeline.clone(), interval);
        self.emit_monitoring(true);

        info!("Monitoring started");
        Ok(())
    }

    /// Stop ingest and every timer, then clear what is on screen.
    pub async fn stop_monitoring(&self) -> Result<()> {
        let mut monitor = self.monitor.lock().await;
        {
            let mut core = self.pipeline.lock();
            if !core.store.is_monitoring {
                return Ok(());
            }
            core.store.stop_monitoring();
        }

        let stopped = monitor.ingest.stop().await;
        monitor.stop_breaks();
        monitor.started = None;
        {
            let mut core = self.pipeline.lock();
            core.engine.teardown();
            core.tracker.reset();
        }
        // Awaited so a following start cannot overtake it.
        self.session.stop_session().await;
        self.emit_monitoring(false);

        info!("Monitoring stopped");
        stopped
    }

    fn emit_monitoring(&self, is_monitoring: bool) {
        self.pipeline
            .host
            .emit("monitoring-changed", json!({ "isMonitoring": is_monitoring }));
    }

    pub fn toggle_minimized(&self) -> bool {
        self.pipeline.lock().store.toggle_minimized()
    }

    pub fn dismiss_alert(&self, id: &str) -> bool {
        let mut core = self.pipeline.lock();
        let removed = core.store.dismiss_alert(id);
        if removed {
            self.pipeline.emit("alerts-changed", &core.store.alerts);
        }
        removed
    }

    pub fn snooze_alert(&self, id: &str, minutes: u32) -> bool {
        let now_ms = self.pipeline.clock.now_ms();
        let mut guard = self.pipeline.lock();
        let core = &mut *guard;
        let removed = core
            .store
            .snooze_alert(id, minutes, now_ms, &mut core.persisted);
        if removed {
            self.pipeline.emit("alerts-changed", &core.store.alerts);
        }
        removed
    }

    pub fn set_camera_status(&self, status: CameraStatus) {
        self.pipeline.lock().store.set_camera_status(status);
    }

    /// Persist a partial settings update and apply it to the live store.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<UserSettings> {
        let merged = self.settings.update(patch.clone())?;
        let mut monitor = self.monitor.lock().await;
        let (monitoring, interval_changed) = {
            let mut core = self.pipeline.lock();
            let before = core.store.settings.notifications.break_reminder_interval;
            core.store.update_settings(patch);
            (
                core.store.is_monitoring,
                before != core.store.settings.notifications.break_reminder_interval,
            )
        };
        if monitoring && interval_changed {
            monitor.restart_breaks(
                self.pipeline.clone(),
                merged.notifications.break_reminder_interval,
            );
        }
        Ok(merged)
    }

    pub fn set_in_meeting(&self, in_meeting: bool) {
        self.pipeline.lock().engine.set_in_meeting(in_meeting);
    }

    pub fn dismiss_toast(&self, id: &str) {
        self.pipeline.lock().engine.dismiss_toast(id);
    }

    pub fn snapshot(&self) -> ErgonomicStore {
        self.pipeline.lock().store.snapshot()
    }

    pub fn toasts(&self) -> Vec<ToastNotification> {
        self.pipeline.lock().engine.toasts().toasts()
    }

    pub fn visual_cue(&self) -> Option<VisualCue> {
        self.pipeline.lock().engine.visual_cue().current()
    }

    pub fn get_current_port(&self) -> u16 {
        self.session.port()
    }

    pub async fn channel_state(&self) -> ChannelState {
        self.monitor.lock().await.ingest.state()
    }

    pub async fn subscribe_channel(&self) -> watch::Receiver<ChannelState> {
        self.monitor.lock().await.ingest.subscribe()
    }
}
