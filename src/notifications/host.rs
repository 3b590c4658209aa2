use std::process::Stdio;

use anyhow::{Context, Result};
use log::warn;
use serde_json::Value;
use tokio::process::Command;
use tokio::runtime::Handle;

use super::models::NotificationPayload;

/// The desktop shell around the engine: native notifications plus a one-way
/// event feed for whatever renders the state.
pub trait HostShell: Send + Sync {
    fn notify(&self, payload: &NotificationPayload) -> Result<()>;

    fn emit(&self, event: &str, payload: Value);
}

/// Writes notifications and events to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHost;

impl HostShell for LogHost {
    fn notify(&self, payload: &NotificationPayload) -> Result<()> {
        log::info!(
            "[notify:{}] {}: {}",
            payload.urgency().as_str(),
            payload.title,
            payload.body
        );
        Ok(())
    }

    fn emit(&self, event: &str, payload: Value) {
        log::debug!("[event] {event}: {payload}");
    }
}

/// Native notifications through `notify-send`. Each child is reaped by a
/// task on the current runtime.
#[derive(Debug, Clone)]
pub struct NotifySendHost {
    program: String,
    app_name: String,
}

impl NotifySendHost {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self::with_program("notify-send", app_name)
    }

    pub fn with_program(program: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            app_name: app_name.into(),
        }
    }
}

impl HostShell for NotifySendHost {
    fn notify(&self, payload: &NotificationPayload) -> Result<()> {
        let runtime = Handle::try_current().context("notify-send needs a tokio runtime")?;
        let mut child = {
            let _guard = runtime.enter();
            Command::new(&self.program)
                .args([
                    "--urgency",
                    payload.urgency().as_str(),
                    "--app-name",
                    &self.app_name,
                    &payload.title,
                    &payload.body,
                ])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .spawn()
                .with_context(|| format!("failed to spawn {}", self.program))?
        };

        let program = self.program.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => warn!("{program} exited with {status}"),
                Ok(_) => {}
                Err(err) => warn!("Failed to wait for {program}: {err}"),
            }
        });
        Ok(())
    }

    fn emit(&self, event: &str, payload: Value) {
        log::debug!("[event] {event}: {payload}");
    }
}
