use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BACKEND_PORT: u16 = 5175;
pub const DEFAULT_BACKEND_HOST: &str = "127.0.0.1";
const APP_DIR_NAME: &str = "posture-companion";

/// Where the local analysis service listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for BackendEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_HOST, DEFAULT_BACKEND_PORT)
    }
}

impl BackendEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn stream_url(&self) -> String {
        format!("ws://{}:{}/api/cv/stream", self.host, self.port)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.host, self.port, path)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendEndpoint,
    pub data_dir: PathBuf,
    pub debug: bool,
    /// Forces monitoring on at boot regardless of the stored setting.
    pub autostart: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("BACKEND_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("BACKEND_PORT is not a port number: {raw:?}"))?,
            None => DEFAULT_BACKEND_PORT,
        };
        let host = lookup("POSTURE_BACKEND_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_HOST.to_string());

        let data_dir = match lookup("POSTURE_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .context("Could not determine the platform data directory")?
                .join(APP_DIR_NAME),
        };

        Ok(Self {
            backend: BackendEndpoint::new(host, port),
            data_dir,
            debug: lookup("POSTURE_DEBUG").is_some_and(|v| is_truthy(&v)),
            autostart: lookup("POSTURE_AUTOSTART").is_some_and(|v| is_truthy(&v)),
        })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("state.sqlite3")
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
