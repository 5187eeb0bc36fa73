//! Top-level job orchestration: initial pass → aggressive retry pass →
//! reconciliation → verification.

use anyhow::{Context, Result};
use std::fs;

use crate::config::HpcConfig;
use crate::reconcile::{self, FinalResults};
use crate::retry::RetryPolicy;
use crate::runner;
use crate::state::StateStore;
use crate::status::StatusLog;
use crate::transfer::{CurlOptions, TransferExecutor};
use crate::verify;

/// What the job produced, for the caller to report on.
#[derive(Debug)]
pub struct JobReport {
    pub results: FinalResults,
    /// False when the post-hoc size check flagged any file.
    pub verified: bool,
}

/// Runs the whole batch job over the given ordered URL list.
///
/// Errors here are the fatal kind (directories, status header, missing
/// transfer binary); permanently failed downloads are reported in the
/// returned [`JobReport`], not as errors.
pub fn run(cfg: &HpcConfig, links: &[String]) -> Result<JobReport> {
    fs::create_dir_all(&cfg.download_dir).with_context(|| {
        format!(
            "could not create download directory {}",
            cfg.download_dir.display()
        )
    })?;
    let store = StateStore::open(&cfg.download_dir).context("could not create state directory")?;
    let exec = TransferExecutor::new(&cfg.transfer_command, CurlOptions::from_config(cfg))?;
    let mut status = StatusLog::create(&cfg.download_dir, links.len())?;

    tracing::info!("=== starting download job ===");
    let initial = runner::run_batch(
        links,
        links,
        cfg.max_concurrent_downloads,
        &cfg.download_dir,
        &store,
        &exec,
        RetryPolicy::from_config(cfg),
        &mut status,
        "Initial Pass",
    );

    tracing::info!("===== summary of initial download pass =====");
    tracing::info!("successfully downloaded/skipped: {} files", initial.success.len());
    tracing::info!("failed in initial pass: {} files", initial.failed.len());
    for (url, error) in &initial.failed {
        tracing::info!("  - {}: {}", url, error);
    }

    let failed_urls = initial.failed_urls();
    let retry = if failed_urls.is_empty() {
        None
    } else {
        Some(runner::run_retry_pass(
            &failed_urls,
            links,
            cfg,
            &store,
            &exec,
            &mut status,
        ))
    };

    let results = reconcile::reconcile(initial, retry);

    tracing::info!("===== final download job summary =====");
    tracing::info!("total successfully downloaded/skipped: {} files", results.success.len());
    tracing::info!("permanently failed after all attempts: {} files", results.failed.len());
    if results.failed.is_empty() {
        tracing::info!("all downloads were successful or skipped");
    } else {
        for (url, error) in &results.failed {
            tracing::warn!("  - {}: {}", url, error);
        }
    }

    let verified = verify::verify_downloads(&cfg.download_dir, links);
    if !verified {
        tracing::warn!("verification failed for some files, check logs");
    }
    tracing::info!("=== download job completed ===");

    Ok(JobReport { results, verified })
}
