use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::json;
use tokio::task::JoinHandle;

use super::host::HostShell;
use super::models::{ToastNotification, VisualCue};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const CUE_MS_PER_INTENSITY: u64 = 2_000;

struct ToastTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct ToastInner {
    toasts: Vec<ToastNotification>,
    timers: HashMap<String, ToastTimer>,
    generation: u64,
}

/// Ordered toast list keyed by id. Non-persistent toasts expire on their own.
#[derive(Clone)]
pub struct ToastBoard {
    inner: Arc<Mutex<ToastInner>>,
    host: Arc<dyn HostShell>,
}

impl ToastBoard {
    pub fn new(host: Arc<dyn HostShell>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ToastInner::default())),
            host,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ToastInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Insert or replace by id. Must run inside a tokio runtime when the
    /// toast is not persistent.
    pub fn show(&self, toast: ToastNotification) {
        let snapshot = {
            let mut inner = self.lock();
            if let Some(old) = inner.timers.remove(&toast.id) {
                old.handle.abort();
            }
            inner.toasts.retain(|t| t.id != toast.id);

            inner.generation = inner.generation.wrapping_add(1);
            let generation = inner.generation;

            if !toast.persistent {
                let board = self.clone();
                let id = toast.id.clone();
                let ttl = Duration::from_millis(toast.duration);
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(ttl).await;
                    board.expire(&id, generation);
                });
                inner.timers.insert(toast.id.clone(), ToastTimer { generation, handle });
            }

            log_debug!("toast shown: {} (persistent={})", toast.id, toast.persistent);
            inner.toasts.push(toast);
            inner.toasts.clone()
        };
        self.publish(&snapshot);
    }

    fn expire(&self, id: &str, generation: u64) {
        let snapshot = {
            let mut inner = self.lock();
            match inner.timers.get(id) {
                Some(timer) if timer.generation == generation => {}
                _ => return,
            }
            inner.timers.remove(id);
            inner.toasts.retain(|t| t.id != id);
            inner.toasts.clone()
        };
        log_debug!("toast expired: {id}");
        self.publish(&snapshot);
    }

    /// Removing an absent id is a no-op.
    pub fn dismiss(&self, id: &str) {
        let snapshot = {
            let mut inner = self.lock();
            if let Some(timer) = inner.timers.remove(id) {
                timer.handle.abort();
            }
            let before = inner.toasts.len();
            inner.toasts.retain(|t| t.id != id);
            if inner.toasts.len() == before {
                return;
            }
            inner.toasts.clone()
        };
        self.publish(&snapshot);
    }

    pub fn toasts(&self) -> Vec<ToastNotification> {
        self.lock().toasts.clone()
    }

    /// Cancel every timer and drop every toast.
    pub fn clear(&self) {
        let was_empty = {
            let mut inner = self.lock();
            for (_, timer) in inner.timers.drain() {
                timer.handle.abort();
            }
            let was_empty = inner.toasts.is_empty();
            inner.toasts.clear();
            was_empty
        };
        if !was_empty {
            self.publish(&[]);
        }
    }

    fn publish(&self, toasts: &[ToastNotification]) {
        self.host.emit("toasts-changed", json!(toasts));
    }
}

#[derive(Default)]
struct CueInner {
    current: Option<VisualCue>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

/// Single visual-cue slot; the latest cue wins.
#[derive(Clone)]
pub struct VisualCueSlot {
    inner: Arc<Mutex<CueInner>>,
    host: Arc<dyn HostShell>,
}

impl VisualCueSlot {
    pub fn new(host: Arc<dyn HostShell>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CueInner::default())),
            host,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CueInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Replace the current cue; it clears itself after `intensity * 2s`.
    pub fn show(&self, cue: VisualCue) {
        let ttl = Duration::from_millis(u64::from(cue.intensity) * CUE_MS_PER_INTENSITY);
        {
            let mut inner = self.lock();
            if let Some(old) = inner.timer.take() {
                old.abort();
            }
            inner.generation = inner.generation.wrapping_add(1);
            let generation = inner.generation;

            let slot = self.clone();
            inner.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                slot.expire(generation);
            }));
            inner.current = Some(cue.clone());
        }
        self.host.emit("visual-cue-changed", json!(cue));
    }

    fn expire(&self, generation: u64) {
        {
            let mut inner = self.lock();
            if inner.generation != generation {
                return;
            }
            inner.timer = None;
            inner.current = None;
        }
        self.host.emit("visual-cue-changed", serde_json::Value::Null);
    }

    pub fn current(&self) -> Option<VisualCue> {
        self.lock().current.clone()
    }

    pub fn clear(&self) {
        let had_cue = {
            let mut inner = self.lock();
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
            inner.generation = inner.generation.wrapping_add(1);
            inner.current.take().is_some()
        };
        if had_cue {
            self.host.emit("visual-cue-changed", serde_json::Value::Null);
        }
    }
}
