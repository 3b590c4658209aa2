mod common;

use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use posture_companion_lib::analysis::Status;
use posture_companion_lib::ingest::ChannelState;
use posture_companion_lib::persisted::PersistedState;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use common::{eventually, harness, NECK_CRITICAL};

const CLOCK: &str = "2026-10-14T10:00:00+00:00";

/// Loopback analysis service. Connection `n` (zero-based) gets the frames
/// in `script[n]` and is then closed; connections past the script stay open
/// until the client leaves. Record each websocket handshake.
async fn spawn_service(script: Vec<Vec<&'static str>>) -> (u16, mpsc::UnboundedReceiver<Instant>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut served = 0usize;
        loop {
            let Ok((tcp, _)) = listener.accept().await else {
                return;
            };
            // Plain HTTP session calls land here too and fail the handshake.
            let Ok(mut ws) = accept_async(tcp).await else {
                continue;
            };
            let _ = tx.send(Instant::now());
            let frames = script.get(served).cloned();
            served += 1;

            tokio::spawn(async move {
                match frames {
                    Some(frames) => {
                        for frame in frames {
                            let _ = ws.send(Message::Text(frame.to_string())).await;
                        }
                        let _ = ws.close(None).await;
                    }
                    None => while let Some(Ok(_)) = ws.next().await {},
                }
            });
        }
    });

    (port, rx)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn remote_close_reconnects_after_fixed_delay_and_keeps_snapshot() {
    let (port, mut connections) = spawn_service(vec![vec![NECK_CRITICAL]]).await;
    let h = harness(port, CLOCK, PersistedState::in_memory());
    let mut state = h.companion.subscribe_channel().await;

    h.companion.start_monitoring().await.unwrap();

    let first = timeout(Duration::from_secs(5), connections.recv())
        .await
        .expect("first connection")
        .unwrap();
    timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ChannelState::ReconnectPending),
    )
    .await
    .expect("reconnect scheduled")
    .unwrap();

    let before = h.companion.snapshot().current_analysis.expect("frame applied");
    assert_eq!(before.statuses.neck, Status::Critical);

    let second = timeout(Duration::from_secs(5), connections.recv())
        .await
        .expect("reconnect attempt")
        .unwrap();
    let gap = second.duration_since(first);
    assert!(gap >= Duration::from_millis(1_400), "reconnected after {gap:?}");
    assert!(gap < Duration::from_secs(4), "reconnected after {gap:?}");

    assert_eq!(h.companion.snapshot().current_analysis, Some(before));

    h.companion.stop_monitoring().await.unwrap();
    assert_eq!(h.companion.channel_state().await, ChannelState::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn quiet_connection_stays_open() {
    let (port, mut connections) = spawn_service(Vec::new()).await;
    let h = harness(port, CLOCK, PersistedState::in_memory());
    h.companion.start_monitoring().await.unwrap();
    timeout(Duration::from_secs(5), connections.recv())
        .await
        .expect("connected")
        .unwrap();

    let mut state = h.companion.subscribe_channel().await;
    timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ChannelState::Open),
    )
    .await
    .expect("open")
    .unwrap();

    // Nothing was sent, so nothing is current yet.
    assert!(h.companion.snapshot().current_analysis.is_none());
    assert_eq!(h.companion.channel_state().await, ChannelState::Open);

    h.companion.stop_monitoring().await.unwrap();
    assert!(connections.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn garbage_then_valid_frame_on_one_socket() {
    let (port, mut connections) =
        spawn_service(vec![vec!["not json", "[]", "{\"landmarks\": 3", NECK_CRITICAL]]).await;
    let h = harness(port, CLOCK, PersistedState::in_memory());
    h.companion.start_monitoring().await.unwrap();

    assert!(eventually(|| h.companion.snapshot().current_analysis.is_some()).await);
    let snap = h.companion.snapshot();
    assert_eq!(snap.alerts.len(), 1);
    assert_eq!(h.host.count("analysis-updated"), 1);

    assert!(connections.recv().await.is_some());
    h.companion.stop_monitoring().await.unwrap();
}

#[tokio::test]
async fn stopping_during_reconnect_wait_goes_idle() {
    // Nothing listens on the discard port, so every connect fails.
    let h = harness(9, CLOCK, PersistedState::in_memory());
    let mut state = h.companion.subscribe_channel().await;
    h.companion.start_monitoring().await.unwrap();

    timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ChannelState::ReconnectPending),
    )
    .await
    .expect("reconnect scheduled")
    .unwrap();

    h.companion.stop_monitoring().await.unwrap();
    assert_eq!(h.companion.channel_state().await, ChannelState::Idle);
    assert!(!h.companion.snapshot().is_monitoring);
}
