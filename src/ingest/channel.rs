use std::time::Duration;

use serde::Serialize;

pub const RECONNECT_DELAY: Duration = Duration::from_millis(1_500);

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChannelState {
    #[default]
    Idle,
    Connecting,
    Open,
    ReconnectPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Start,
    Connected,
    Closed,
    Errored,
    ReconnectElapsed,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    Connect,
    /// Entering `Open`: drop any pending reconnect timer.
    CancelReconnect,
    ScheduleReconnect(Duration),
    Teardown,
    Nothing,
}

/// Transition table for the stream connection. `monitoring` is the store's
/// monitoring flag at the moment the event is handled.
pub fn transition(
    state: ChannelState,
    event: ChannelEvent,
    monitoring: bool,
) -> (ChannelState, ChannelAction) {
    use ChannelAction as A;
    use ChannelEvent as E;
    use ChannelState as S;

    match (state, event) {
        (_, E::Stop) => (S::Idle, A::Teardown),

        (S::Idle, E::Start) if monitoring => (S::Connecting, A::Connect),

        (S::Connecting, E::Connected) => (S::Open, A::CancelReconnect),

        (S::Connecting | S::Open, E::Closed | E::Errored) => {
            if monitoring {
                (S::ReconnectPending, A::ScheduleReconnect(RECONNECT_DELAY))
            } else {
                (S::Idle, A::Teardown)
            }
        }

        (S::ReconnectPending, E::ReconnectElapsed) => {
            if monitoring {
                (S::Connecting, A::Connect)
            } else {
                (S::Idle, A::Teardown)
            }
        }

        (state, _) => (state, A::Nothing),
    }
}
