//! Append-only human-readable status log (`download_status.txt`).
//!
//! Written once with a header before the batch starts, then a full
//! snapshot after every individual completion. Only the collector thread
//! writes to it, so appends never interleave.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::reconcile::BatchResults;

/// Name of the status file inside the download directory.
pub const STATUS_FILE_NAME: &str = "download_status.txt";

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Writer for the per-job progress log, suitable for tailing.
#[derive(Debug)]
pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    /// Creates the status file with its header. A header that cannot be
    /// written is fatal: the whole point of the file is monitoring.
    pub fn create(download_dir: &Path, total_urls: usize) -> Result<Self> {
        let path = download_dir.join(STATUS_FILE_NAME);
        let mut f = File::create(&path)
            .with_context(|| format!("could not write status file {}", path.display()))?;
        writeln!(
            f,
            "Download job started at {}",
            Local::now().format(TIMESTAMP_FMT)
        )?;
        writeln!(f, "Downloading {total_urls} files")?;
        f.flush()?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a full snapshot of the pass. Failures after the header are
    /// logged and swallowed so a full disk cannot kill the batch.
    pub fn append_snapshot(&mut self, pass_name: &str, total_urls: usize, results: &BatchResults) {
        if let Err(e) = self.try_append(pass_name, total_urls, results) {
            tracing::warn!("could not append to {}: {}", self.path.display(), e);
        }
    }

    fn try_append(
        &mut self,
        pass_name: &str,
        total_urls: usize,
        results: &BatchResults,
    ) -> io::Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            f,
            "\n--- Status Update ({} - {}) ---",
            pass_name,
            Local::now().format(TIMESTAMP_FMT)
        )?;
        writeln!(f, "Total URLs: {total_urls}")?;
        writeln!(f, "Successful/Skipped: {}", results.success.len())?;
        writeln!(f, "Failed: {}", results.failed.len())?;
        writeln!(f, "Still Pending: {}", results.pending.len())?;

        if !results.success.is_empty() {
            writeln!(f, "\nSuccessful/Skipped Downloads:")?;
            for (url, message) in &results.success {
                writeln!(f, "  ✓ {url} ({message})")?;
            }
        }
        if !results.failed.is_empty() {
            writeln!(f, "\nFailed Downloads (current list):")?;
            for (url, error) in &results.failed {
                writeln!(f, "  ✗ {url} (Error: {error})")?;
            }
        }
        if !results.pending.is_empty() {
            writeln!(f, "\nPending Downloads:")?;
            for url in &results.pending {
                writeln!(f, "  ⟳ {url}")?;
            }
        }
        writeln!(f, "--- End Status Update ---")?;
        f.flush()
    }
}
