//! Server configuration
//!
//! Read from `FERRUMKV_*` environment variables, optionally seeded from a
//! `.env` file in the working directory.

use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_ADDR: &str = "FERRUMKV_ADDR";
pub const ENV_SNAPSHOT_PATH: &str = "FERRUMKV_SNAPSHOT_PATH";
pub const ENV_PERSIST_INTERVAL_SECS: &str = "FERRUMKV_PERSIST_INTERVAL_SECS";
pub const ENV_LOG_FORMAT: &str = "FERRUMKV_LOG_FORMAT";

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SNAPSHOT_FILE: &str = "storage.json";
const DEFAULT_PERSIST_INTERVAL_SECS: u64 = 30;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen address
    pub addr: SocketAddr,
    /// Path to the snapshot file
    pub snapshot_path: PathBuf,
    /// Time between two automatic saves
    pub persist_interval: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source, missing variables take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addr_text = var(ENV_ADDR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_text
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("{ENV_ADDR} is not a socket address: {addr_text}"))?;

        let snapshot_path = match var(ENV_SNAPSHOT_PATH) {
            Some(path) => PathBuf::from(path),
            None => default_snapshot_path(),
        };

        let persist_interval = match var(ENV_PERSIST_INTERVAL_SECS) {
            Some(text) => {
                let secs = text
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("{ENV_PERSIST_INTERVAL_SECS} is not a number: {text}"))?;
                if secs == 0 {
                    return Err(anyhow!("{ENV_PERSIST_INTERVAL_SECS} must be greater than zero"));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_PERSIST_INTERVAL_SECS),
        };

        let log_format = match var(ENV_LOG_FORMAT).map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => return Err(anyhow!("{ENV_LOG_FORMAT} must be `text` or `json`, got {v}")),
        };

        Ok(Config {
            addr,
            snapshot_path,
            persist_interval,
            log_format,
        })
    }
}

/// `storage.json` in the working directory
fn default_snapshot_path() -> PathBuf {
    std::env::current_dir()
        .map(|dir| dir.join(DEFAULT_SNAPSHOT_FILE))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SNAPSHOT_FILE))
}
