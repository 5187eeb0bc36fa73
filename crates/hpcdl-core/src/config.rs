//! Job configuration: download directory, worker counts, curl-level and
//! script-level retry parameters.
//!
//! All keys have defaults; a missing config file means "run with defaults",
//! a malformed one is a fatal error (the job must not start half-configured).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hpcdl.toml";

/// Fatal configuration problems. These abort before any download starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Full job configuration loaded from TOML.
///
/// The `curl_*` keys map one-to-one onto options of the external transfer
/// tool (its internal retry loop and timeouts); the `downloader_*` keys
/// drive the script-level retry loop around whole transfer attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HpcConfig {
    /// Directory payloads are written to (also holds state markers and the status log).
    pub download_dir: PathBuf,
    /// Worker-pool size for the initial pass.
    pub max_concurrent_downloads: usize,
    /// Worker-pool size for the aggressive retry pass.
    pub retry_workers: usize,
    /// Name or path of the external transfer binary, resolved on PATH at startup.
    pub transfer_command: String,

    /// --retry: transfer-internal retries for transient errors.
    pub curl_retry_attempts: u32,
    /// --retry-delay: delay between transfer-internal retries.
    pub curl_retry_delay_seconds: u64,
    /// --retry-max-time: time budget for transfer-internal retries.
    pub curl_retry_max_time_seconds: u64,
    /// --connect-timeout: max time to establish a connection.
    pub curl_connect_timeout_seconds: u64,
    /// --max-time: max time for one whole transfer attempt.
    pub curl_max_time_seconds: u64,
    /// --speed-time: abort if below the speed limit for this long.
    pub curl_speed_time_seconds: u64,
    /// --speed-limit: minimum transfer speed in bytes/sec.
    pub curl_speed_limit_bytes_per_sec: u64,

    /// Script-level re-attempts of a failed transfer (total attempts = this + 1).
    pub downloader_max_retries: u32,
    /// Initial backoff before the first script-level retry; doubles per retry, capped at 300s.
    pub downloader_initial_retry_delay_seconds: u64,

    /// Script-level retries for the aggressive pass over initially failed URLs.
    pub downloader_aggressive_max_retries: u32,
    /// Initial backoff for the aggressive pass.
    pub downloader_aggressive_initial_retry_delay_seconds: u64,
    /// Overrides `curl_max_time_seconds` during the aggressive pass.
    pub downloader_aggressive_timeout_seconds: u64,
}

impl Default for HpcConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            max_concurrent_downloads: 3,
            retry_workers: 2,
            transfer_command: "curl".to_string(),
            curl_retry_attempts: 3,
            curl_retry_delay_seconds: 5,
            curl_retry_max_time_seconds: 60,
            curl_connect_timeout_seconds: 30,
            curl_max_time_seconds: 1800,
            curl_speed_time_seconds: 60,
            curl_speed_limit_bytes_per_sec: 1000,
            downloader_max_retries: 5,
            downloader_initial_retry_delay_seconds: 10,
            downloader_aggressive_max_retries: 8,
            downloader_aggressive_initial_retry_delay_seconds: 30,
            downloader_aggressive_timeout_seconds: 3600,
        }
    }
}

/// Load configuration.
///
/// With an explicit path the file must exist and parse. Without one,
/// `hpcdl.toml` in the working directory is used if present, else defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<HpcConfig, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !p.exists() {
                tracing::debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                return Ok(HpcConfig::default());
            }
            p
        }
    };

    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let cfg: HpcConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
