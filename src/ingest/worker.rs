use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::channel::{transition, ChannelAction, ChannelEvent, ChannelState};
use super::FrameSink;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum SessionEnd {
    Closed,
    Errored,
    Cancelled,
}

/// Drives one logical stream connection until `cancel_token` fires.
///
/// At most one socket exists at any time: a new connect only starts after
/// the previous socket has been dropped.
pub async fn ingest_loop(
    url: String,
    sink: Arc<dyn FrameSink>,
    cancel_token: CancellationToken,
    state_tx: watch::Sender<ChannelState>,
) {
    let mut state = ChannelState::Idle;
    let mut action = step(&mut state, ChannelEvent::Start, &cancel_token, &state_tx);

    loop {
        action = match action {
            ChannelAction::Connect => {
                log_debug!("connecting to {url}");
                tokio::select! {
                    result = connect_async(url.as_str()) => match result {
                        Ok((stream, _response)) => {
                            // No reconnect timer can be pending: the sleep runs inline below.
                            step(&mut state, ChannelEvent::Connected, &cancel_token, &state_tx);
                            log_info!("analysis stream open at {url}");
                            match read_frames(stream, sink.as_ref(), &cancel_token).await {
                                SessionEnd::Closed => step(&mut state, ChannelEvent::Closed, &cancel_token, &state_tx),
                                SessionEnd::Errored => step(&mut state, ChannelEvent::Errored, &cancel_token, &state_tx),
                                SessionEnd::Cancelled => step(&mut state, ChannelEvent::Stop, &cancel_token, &state_tx),
                            }
                        }
                        Err(err) => {
                            log_debug!("connect to {url} failed: {err}");
                            step(&mut state, ChannelEvent::Errored, &cancel_token, &state_tx)
                        }
                    },
                    _ = cancel_token.cancelled() => step(&mut state, ChannelEvent::Stop, &cancel_token, &state_tx),
                }
            }
            ChannelAction::ScheduleReconnect(delay) => {
                log_debug!("reconnecting in {}ms", delay.as_millis());
                tokio::select! {
                    _ = tokio::time::sleep(delay) => step(&mut state, ChannelEvent::ReconnectElapsed, &cancel_token, &state_tx),
                    _ = cancel_token.cancelled() => step(&mut state, ChannelEvent::Stop, &cancel_token, &state_tx),
                }
            }
            ChannelAction::CancelReconnect | ChannelAction::Teardown | ChannelAction::Nothing => {
                break
            }
        };
    }

    log_info!("analysis stream loop shutting down");
}

fn step(
    state: &mut ChannelState,
    event: ChannelEvent,
    cancel_token: &CancellationToken,
    state_tx: &watch::Sender<ChannelState>,
) -> ChannelAction {
    let monitoring = !cancel_token.is_cancelled();
    let (next, action) = transition(*state, event, monitoring);
    if next != *state {
        log_debug!("stream {:?} --{:?}--> {:?}", *state, event, next);
        *state = next;
        state_tx.send_replace(next);
    }
    action
}

async fn read_frames(
    mut stream: Stream,
    sink: &dyn FrameSink,
    cancel_token: &CancellationToken,
) -> SessionEnd {
    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    sink.on_frame(&text);
                }
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        sink.on_frame(text);
                    }
                    Err(_) => log_debug!("dropping non-UTF-8 binary frame ({} bytes)", bytes.len()),
                },
                Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    log_debug!("analysis stream error: {err}");
                    return SessionEnd::Errored;
                }
            },
            _ = cancel_token.cancelled() => {
                let _ = stream.close(None).await;
                let _ = stream.flush().await;
                return SessionEnd::Cancelled;
            }
        }
    }
}
