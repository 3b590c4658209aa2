pub mod derivation;
pub mod models;
pub mod tracker;

pub use derivation::AlertDeriver;
pub use models::{
    AlertKind, AlertSeverity, BreakReminder, BreakType, ErgonomicAlert, PostureAlert,
    PostureAlertType,
};
pub use tracker::PostureTracker;
