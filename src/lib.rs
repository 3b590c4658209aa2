pub mod alerts;
pub mod analysis;
pub mod clock;
pub mod companion;
pub mod config;
pub mod db;
pub mod ingest;
pub mod notifications;
pub mod persisted;
pub mod settings;
pub mod store;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::clock::SystemClock;
use crate::companion::Companion;
use crate::config::AppConfig;
use crate::db::Database;
use crate::ingest::SessionClient;
use crate::notifications::{HostShell, LogHost, NotifySendHost};
use crate::persisted::{PersistedState, SqliteKeyValueStore};
use crate::settings::SettingsStore;

const APP_NAME: &str = "Posture Companion";

pub fn run() {
    let config = AppConfig::from_env();
    let level = match &config {
        Ok(config) if config.debug => log::LevelFilter::Debug,
        _ => log::LevelFilter::Info,
    };
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Posture companion starting up...");

    let result = config.and_then(|config| {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to build tokio runtime")?;
        runtime.block_on(serve(config))
    });

    if let Err(err) = result {
        log::error!("Posture companion failed: {err:#}");
        std::process::exit(1);
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let settings = SettingsStore::new(config.settings_path())?;
    let autostart = config.autostart || settings.snapshot().auto_start_monitoring;

    let database = Database::new(config.database_path())?;
    let kv = SqliteKeyValueStore::open(database.clone()).await?;

    // notify-send only exists on freedesktop desktops.
    let host: Arc<dyn HostShell> = if cfg!(target_os = "linux") {
        Arc::new(NotifySendHost::new(APP_NAME))
    } else {
        Arc::new(LogHost)
    };

    let companion = Companion::new(
        settings,
        PersistedState::new(Box::new(kv)),
        SessionClient::new(config.backend.clone()),
        host,
        Arc::new(SystemClock),
    );
    log::info!(
        "Analysis service expected on port {}",
        companion.get_current_port()
    );

    if autostart {
        companion.start_monitoring().await?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    log::info!("Shutting down");

    companion.stop_monitoring().await?;
    database.flush().await?;
    Ok(())
}
