pub mod channel;
pub mod controller;
pub mod session;
pub mod worker;

pub use channel::{ChannelState, RECONNECT_DELAY};
pub use controller::IngestController;
pub use session::SessionClient;

/// Receives raw text frames from the analysis stream.
pub trait FrameSink: Send + Sync {
    /// Returns `false` when the frame was dropped as malformed.
    fn on_frame(&self, text: &str) -> bool;
}
