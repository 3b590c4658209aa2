use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::alerts::{AlertSeverity, BreakReminder, PostureAlert};
use crate::persisted::PersistedState;
use crate::settings::{DeliveryPreference, NotificationSettings};

use super::channels::{ToastBoard, VisualCueSlot};
use super::gate::{GateDecision, NotificationContext, NotificationGate};
use super::host::HostShell;
use super::models::{
    CueTarget, Delivery, NotificationPayload, ToastNotification, ToastType, VisualCue,
    VisualCueType,
};

pub const SYSTEM_TIER_SECS: u64 = 300;
pub const WARNING_TOAST_TIER_SECS: u64 = 120;
pub const TIP_TOAST_TIER_SECS: u64 = 60;
pub const VISUAL_TIER_SECS: u64 = 30;

pub const WARNING_TOAST_MS: u64 = 6_000;
pub const TIP_TOAST_MS: u64 = 4_000;
pub const BREAK_TOAST_MS: u64 = 8_000;

const CUE_COLOR: &str = "#f59e0b";

pub fn posture_key(alert: &PostureAlert) -> String {
    format!("posture-{}", alert.alert_type.as_str())
}

pub fn break_key(reminder: &BreakReminder) -> String {
    format!("break-{}", reminder.break_type.as_str())
}

/// Pick the channel for a posture alert. Tiers are tried from the longest
/// duration down and the first match wins.
pub fn escalate(alert: &PostureAlert, key: &str) -> Option<Delivery> {
    if alert.duration >= SYSTEM_TIER_SECS && alert.severity == AlertSeverity::Critical {
        return Some(Delivery::System(NotificationPayload::new(
            "Critical posture",
            alert.message.clone(),
            true,
        )));
    }
    if alert.duration >= WARNING_TOAST_TIER_SECS {
        return Some(Delivery::Toast(ToastNotification {
            id: key.to_string(),
            title: "Posture check".into(),
            message: alert.message.clone(),
            toast_type: ToastType::Warning,
            duration: WARNING_TOAST_MS,
            actions: Vec::new(),
            persistent: false,
        }));
    }
    if alert.duration >= TIP_TOAST_TIER_SECS {
        return Some(Delivery::Toast(ToastNotification {
            id: key.to_string(),
            title: "Quick tip".into(),
            message: alert.recommendation.clone(),
            toast_type: ToastType::Info,
            duration: TIP_TOAST_MS,
            actions: Vec::new(),
            persistent: false,
        }));
    }
    if alert.duration >= VISUAL_TIER_SECS {
        return Some(Delivery::Visual(VisualCue {
            cue_type: VisualCueType::BorderGlow,
            intensity: 1,
            target: CueTarget::EntireApp,
            color: CUE_COLOR.into(),
        }));
    }
    None
}

/// Result of offering one alert or reminder to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub key: String,
    pub decision: GateDecision,
    pub deliveries: Vec<Delivery>,
}

pub struct NotificationEngine {
    gate: NotificationGate,
    context: NotificationContext,
    host: Arc<dyn HostShell>,
    toasts: ToastBoard,
    cue: VisualCueSlot,
}

impl NotificationEngine {
    pub fn new(host: Arc<dyn HostShell>) -> Self {
        Self::with_gate(host, NotificationGate::default())
    }

    pub fn with_gate(host: Arc<dyn HostShell>, gate: NotificationGate) -> Self {
        Self {
            gate,
            context: NotificationContext::default(),
            toasts: ToastBoard::new(host.clone()),
            cue: VisualCueSlot::new(host.clone()),
            host,
        }
    }

    pub fn set_in_meeting(&mut self, in_meeting: bool) {
        self.context.in_meeting = in_meeting;
    }

    pub fn toasts(&self) -> &ToastBoard {
        &self.toasts
    }

    pub fn visual_cue(&self) -> &VisualCueSlot {
        &self.cue
    }

    pub fn process_posture_alert(
        &mut self,
        alert: &PostureAlert,
        settings: &NotificationSettings,
        now: &DateTime<FixedOffset>,
        persisted: &mut PersistedState,
    ) -> Dispatch {
        let key = posture_key(alert);
        let decision = self
            .gate
            .evaluate(&key, settings, &self.context, now, persisted);
        if !decision.allowed() {
            log::debug!("suppressed {key}: {decision:?}");
            return Dispatch {
                key,
                decision,
                deliveries: Vec::new(),
            };
        }

        let deliveries: Vec<Delivery> = escalate(alert, &key).into_iter().collect();
        for delivery in &deliveries {
            self.deliver(delivery);
        }
        // Recorded even when no tier matched.
        self.gate.mark_shown(&key, now.timestamp_millis());

        Dispatch {
            key,
            decision,
            deliveries,
        }
    }

    pub fn process_break_reminder(
        &mut self,
        reminder: &BreakReminder,
        settings: &NotificationSettings,
        now: &DateTime<FixedOffset>,
        persisted: &mut PersistedState,
    ) -> Dispatch {
        let key = break_key(reminder);
        let decision = self
            .gate
            .evaluate(&key, settings, &self.context, now, persisted);
        if !decision.allowed() {
            log::debug!("suppressed {key}: {decision:?}");
            return Dispatch {
                key,
                decision,
                deliveries: Vec::new(),
            };
        }

        let message = format!(
            "You have worked for {} min. Take a {} min break.",
            reminder.time_worked, reminder.suggested_duration
        );

        let mut deliveries = Vec::with_capacity(2);
        if settings.preferred_delivery != DeliveryPreference::Visual {
            deliveries.push(Delivery::System(NotificationPayload::new(
                "Break reminder",
                message.clone(),
                false,
            )));
        }
        deliveries.push(Delivery::Toast(ToastNotification {
            id: key.clone(),
            title: "Time for a break".into(),
            message,
            toast_type: ToastType::Info,
            duration: BREAK_TOAST_MS,
            actions: Vec::new(),
            persistent: true,
        }));

        for delivery in &deliveries {
            self.deliver(delivery);
        }
        self.gate.mark_shown(&key, now.timestamp_millis());

        Dispatch {
            key,
            decision,
            deliveries,
        }
    }

    fn deliver(&self, delivery: &Delivery) {
        match delivery {
            Delivery::System(payload) => {
                if let Err(err) = self.host.notify(payload) {
                    log::warn!("system notification failed: {err:#}");
                }
            }
            Delivery::Toast(toast) => self.toasts.show(toast.clone()),
            Delivery::Visual(cue) => self.cue.show(cue.clone()),
        }
    }

    pub fn dismiss_toast(&self, id: &str) {
        self.toasts.dismiss(id);
    }

    /// Cancel channel timers and clear what is on screen.
    pub fn teardown(&self) {
        self.toasts.clear();
        self.cue.clear();
    }
}
