//! Transfer executor: one external-tool invocation per attempt.
//!
//! The transfer binary (curl by default) is spawned with a fixed option
//! set per attempt; its output is streamed line-by-line to the log for
//! observability only. An attempt succeeds when the tool exits zero AND
//! the destination file exists with size > 0.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::HpcConfig;

/// Options forwarded to the transfer tool for one attempt.
///
/// Validated once at construction and shared by value between workers.
/// Resume-from-partial (`-C -`) is always enabled.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub retry_max_time: Duration,
    pub connect_timeout: Duration,
    pub max_time: Duration,
    pub speed_time: Duration,
    pub speed_limit_bytes_per_sec: u64,
}

impl CurlOptions {
    pub fn from_config(cfg: &HpcConfig) -> Self {
        Self {
            retry_attempts: cfg.curl_retry_attempts,
            retry_delay: Duration::from_secs(cfg.curl_retry_delay_seconds),
            retry_max_time: Duration::from_secs(cfg.curl_retry_max_time_seconds),
            connect_timeout: Duration::from_secs(cfg.curl_connect_timeout_seconds),
            max_time: Duration::from_secs(cfg.curl_max_time_seconds),
            speed_time: Duration::from_secs(cfg.curl_speed_time_seconds),
            speed_limit_bytes_per_sec: cfg.curl_speed_limit_bytes_per_sec,
        }
    }

    /// Same options with a different overall time budget (aggressive pass).
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }
}

/// Observable result of one transfer attempt. Failures here are retry
/// fodder for the driver, not errors.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// Tool exited zero and the file is present and non-empty.
    Completed { bytes: u64 },
    /// Non-zero exit, or a reported success with a missing/zero-size file.
    Failed { reason: String },
}

/// Invokes the external transfer binary, one process per attempt.
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    binary: PathBuf,
    options: CurlOptions,
}

impl TransferExecutor {
    /// Resolves `command` on PATH (or as a direct path) and binds the
    /// option set. An unresolvable binary is fatal before any download.
    pub fn new(command: &str, options: CurlOptions) -> Result<Self> {
        let binary = which::which(command)
            .with_context(|| format!("transfer command '{command}' not found on PATH"))?;
        tracing::debug!("transfer binary resolved to {}", binary.display());
        Ok(Self { binary, options })
    }

    /// Same resolved binary with a different option set.
    pub fn with_options(&self, options: CurlOptions) -> Self {
        Self {
            binary: self.binary.clone(),
            options,
        }
    }

    /// Runs one transfer attempt for `url` into `dest`.
    ///
    /// Streams the child's stdout and stderr to the log line-by-line.
    /// Spawn/pipe errors are returned to the driver, which contains them.
    pub fn attempt(&self, url: &str, dest: &Path) -> Result<AttemptOutcome> {
        let o = &self.options;
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-L")
            .args(["-C", "-"])
            .args(["--retry", &o.retry_attempts.to_string()])
            .args(["--retry-delay", &o.retry_delay.as_secs().to_string()])
            .args(["--retry-max-time", &o.retry_max_time.as_secs().to_string()])
            .args(["--connect-timeout", &o.connect_timeout.as_secs().to_string()])
            .args(["--max-time", &o.max_time.as_secs().to_string()])
            .args(["--speed-time", &o.speed_time.as_secs().to_string()])
            .args(["--speed-limit", &o.speed_limit_bytes_per_sec.to_string()])
            .arg("-#")
            .arg("-o")
            .arg(dest)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(url, "transfer cmd: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("could not spawn {}", self.binary.display()))?;

        // Drain stderr on a side thread so neither pipe can fill up and
        // stall the child.
        let label = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let stderr_thread = child.stderr.take().map(|pipe| {
            let label = label.clone();
            std::thread::spawn(move || {
                for line in BufReader::new(pipe).lines().map_while(|l| l.ok()) {
                    let line = line.trim();
                    if !line.is_empty() {
                        tracing::debug!(file = %label, "transfer: {}", line);
                    }
                }
            })
        });
        if let Some(pipe) = child.stdout.take() {
            for line in BufReader::new(pipe).lines() {
                let line = line.context("reading transfer output")?;
                let line = line.trim();
                if !line.is_empty() {
                    tracing::debug!(file = %label, "transfer: {}", line);
                }
            }
        }

        let status = child.wait().context("waiting for transfer process")?;
        if let Some(handle) = stderr_thread {
            let _ = handle.join();
        }

        if !status.success() {
            let reason = match status.code() {
                Some(code) => format!("transfer exit code {code}"),
                None => "transfer terminated by signal".to_string(),
            };
            return Ok(AttemptOutcome::Failed { reason });
        }

        // Exit code 0 alone is not success: the tool can report success
        // for an empty body.
        match std::fs::metadata(dest) {
            Ok(meta) if meta.len() > 0 => Ok(AttemptOutcome::Completed { bytes: meta.len() }),
            _ => Ok(AttemptOutcome::Failed {
                reason: "transfer reported success but file is missing or zero size".to_string(),
            }),
        }
    }
}
