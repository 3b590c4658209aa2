use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::channel::ChannelState;
use super::worker::ingest_loop;
use super::FrameSink;

/// Owns the single stream task. Starting again replaces the previous task.
pub struct IngestController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    state_tx: watch::Sender<ChannelState>,
}

impl Default for IngestController {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestController {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Idle);
        Self {
            handle: None,
            cancel_token: None,
            state_tx,
        }
    }

    pub async fn start(&mut self, url: String, sink: Arc<dyn FrameSink>) -> Result<()> {
        if self.handle.is_some() {
            info!("Replacing running analysis stream");
            self.stop().await?;
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(ingest_loop(
            url,
            sink,
            cancel_token.clone(),
            self.state_tx.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the task (closing the socket or the pending reconnect) and
    /// wait for it to finish.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("analysis stream task failed to join")?;
        }
        self.state_tx.send_replace(ChannelState::Idle);
        Ok(())
    }

    pub fn state(&self) -> ChannelState {
        *self.state_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }
}
