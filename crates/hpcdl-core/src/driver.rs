//! Single-file download driver: the per-URL state machine.
//!
//! Skip-if-completed, then a bounded attempt loop with exponential
//! backoff. Every terminal outcome overwrites the state marker. Faults
//! of any kind are contained here; a driver invocation always hands an
//! outcome back to its worker, never a panic or an error.

use std::path::Path;

use crate::retry::RetryPolicy;
use crate::state::{FileState, StateStore};
use crate::transfer::{AttemptOutcome, TransferExecutor};
use crate::url_model::target_filename;

/// Outcome of one driver invocation, as handed back to the collector.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub url: String,
    pub success: bool,
    pub message: String,
}

impl FileOutcome {
    fn ok(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            success: true,
            message,
        }
    }

    fn failed(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            success: false,
            message,
        }
    }
}

/// Downloads one URL to completion, including all script-level retries.
///
/// Never returns an error: unexpected faults (spawn failures, fs errors)
/// are logged, best-effort recorded as a FAILED marker, and reported as
/// a failure outcome so they cannot abort the worker pool.
pub fn download_one(
    url: &str,
    original_links: &[String],
    download_dir: &Path,
    store: &StateStore,
    exec: &TransferExecutor,
    policy: &RetryPolicy,
) -> FileOutcome {
    let filename = target_filename(url, original_links);
    match run_attempts(url, &filename, download_dir, store, exec, policy) {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = format!("unexpected fault while downloading {url}: {e:#}");
            tracing::error!(file = %filename, "{}", message);
            store.write(&filename, &FileState::Failed(format!("Exception - {e:#}")));
            FileOutcome::failed(url, message)
        }
    }
}

fn run_attempts(
    url: &str,
    filename: &str,
    download_dir: &Path,
    store: &StateStore,
    exec: &TransferExecutor,
    policy: &RetryPolicy,
) -> anyhow::Result<FileOutcome> {
    if store.read(filename) == FileState::Completed {
        tracing::info!(file = %filename, url, "skipped, already marked COMPLETED");
        return Ok(FileOutcome::ok(url, "Skipped, already completed".to_string()));
    }

    let dest = download_dir.join(filename);
    tracing::info!(file = %filename, url, "starting download");

    for attempt in 1..=policy.total_attempts() {
        if let Some(delay) = policy.delay_before(attempt) {
            tracing::info!(
                file = %filename,
                "script retry {}/{}, waiting {}s",
                attempt - 1,
                policy.max_retries,
                delay.as_secs()
            );
            std::thread::sleep(delay);
        }

        match exec.attempt(url, &dest)? {
            AttemptOutcome::Completed { bytes } => {
                let size_mb = bytes as f64 / (1024.0 * 1024.0);
                tracing::info!(file = %filename, url, "completed, size {:.2} MB", size_mb);
                store.write(filename, &FileState::Completed);
                return Ok(FileOutcome::ok(
                    url,
                    format!("Completed, Size: {size_mb:.2} MB"),
                ));
            }
            AttemptOutcome::Failed { reason } => {
                tracing::warn!(file = %filename, url, attempt, "attempt failed: {}", reason);
            }
        }
    }

    let message = format!(
        "Failed after {} script retries (transfer errors or zero-size file).",
        policy.max_retries
    );
    tracing::warn!(file = %filename, url, "{}", message);
    store.write(filename, &FileState::Failed(message.clone()));
    Ok(FileOutcome::failed(url, message))
}
