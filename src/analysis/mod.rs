pub mod frame;
pub mod severity;
pub mod types;

pub use frame::AnalysisFrame;
pub use severity::normalize;
pub use types::{ErgonomicAnalysis, LandmarkPoint, Landmarks, Metric, Scores, Status, Statuses};
