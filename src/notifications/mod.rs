pub mod channels;
pub mod engine;
pub mod gate;
pub mod host;
pub mod models;

pub use channels::{ToastBoard, VisualCueSlot};
pub use engine::{escalate, Dispatch, NotificationEngine};
pub use gate::{GateDecision, NotificationContext, NotificationGate};
pub use host::{HostShell, LogHost, NotifySendHost};
pub use models::{
    CueTarget, Delivery, NotificationPayload, ToastNotification, ToastType, Urgency, VisualCue,
    VisualCueType,
};
