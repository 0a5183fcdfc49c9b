//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_API_URL: &str = "http://localhost:54321";
const DEFAULT_HEALTH_PATH: &str = "/rest/v1/";
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 15;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the remote backend.
    pub api_url: String,
    /// Sent as `apikey` and bearer token when present.
    pub api_key: Option<String>,
    /// Path probed to decide whether the backend is reachable.
    pub health_path: String,
    pub probe_interval: Duration,
    pub request_timeout: Duration,
    /// Directory holding the local database.
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Read configuration from `BRICKERP_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url = lookup("BRICKERP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = lookup("BRICKERP_API_KEY").filter(|k| !k.is_empty());
        let health_path =
            lookup("BRICKERP_HEALTH_PATH").unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string());

        let probe_interval = match lookup("BRICKERP_PROBE_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("BRICKERP_PROBE_INTERVAL_SECS is not a number: {raw:?}"))?,
            ),
            None => Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
        };
        if probe_interval.is_zero() {
            anyhow::bail!("BRICKERP_PROBE_INTERVAL_SECS must be greater than zero");
        }

        let data_dir = match lookup("BRICKERP_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            api_url,
            api_key,
            health_path,
            probe_interval,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            data_dir,
        })
    }

    /// Path of the SQLite database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("local.db")
    }

    pub fn health_url(&self) -> String {
        join_url(&self.api_url, &self.health_path)
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `{app_data_dir}/brickerp`, falling back to `~/.local/share/brickerp`.
fn default_data_dir() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - set BRICKERP_DATA_DIR")?;
    dir.push("brickerp");
    Ok(dir)
}
