//! Concurrent batch runner: a bounded worker pool over the URL set.
//!
//! Workers pull URLs from a shared queue, run the single-file driver to
//! completion, and post outcomes over a channel. The collector is the
//! only mutator of the result set and the status log; it folds outcomes
//! in completion order and snapshots the status file after each one.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::HpcConfig;
use crate::driver;
use crate::reconcile::BatchResults;
use crate::retry::RetryPolicy;
use crate::state::StateStore;
use crate::status::StatusLog;
use crate::transfer::{CurlOptions, TransferExecutor};

/// Runs the driver over `urls` with a fixed-size worker pool.
///
/// `original_links` is the full ordered links list (fallback filenames
/// are derived from positions in it, also during the retry pass).
/// Outcomes are folded in completion order; a worker that dies without
/// reporting turns its remaining work into failures rather than hanging
/// or aborting siblings.
#[allow(clippy::too_many_arguments)]
pub fn run_batch(
    urls: &[String],
    original_links: &[String],
    max_workers: usize,
    download_dir: &Path,
    store: &StateStore,
    exec: &TransferExecutor,
    policy: RetryPolicy,
    status: &mut StatusLog,
    pass_name: &str,
) -> BatchResults {
    let links: Arc<Vec<String>> = Arc::new(original_links.to_vec());
    let store = store.clone();
    let exec = exec.clone();
    let dir = download_dir.to_path_buf();
    run_batch_with(
        urls,
        max_workers,
        move |url| driver::download_one(url, &links, &dir, &store, &exec, &policy),
        status,
        pass_name,
    )
}

/// Pool-and-collector loop over an arbitrary per-URL worker function.
/// Split out from [`run_batch`] so worker-death handling can be exercised
/// without a real transfer.
fn run_batch_with<F>(
    urls: &[String],
    max_workers: usize,
    worker: F,
    status: &mut StatusLog,
    pass_name: &str,
) -> BatchResults
where
    F: Fn(&str) -> driver::FileOutcome + Send + Sync + 'static,
{
    tracing::info!(
        "starting concurrent download of {} files with {} workers ({})",
        urls.len(),
        max_workers.max(1),
        pass_name
    );

    let work: Arc<Mutex<VecDeque<String>>> =
        Arc::new(Mutex::new(urls.iter().cloned().collect()));
    let worker = Arc::new(worker);
    let (tx, rx) = mpsc::channel::<driver::FileOutcome>();

    let num_workers = max_workers.max(1).min(urls.len());
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let worker = Arc::clone(&worker);
        let tx = tx.clone();
        handles.push(std::thread::spawn(move || loop {
            let url = match work.lock().unwrap().pop_front() {
                Some(u) => u,
                None => break,
            };
            let outcome = worker(&url);
            if tx.send(outcome).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    let mut results = BatchResults::with_pending(urls);
    let mut to_receive = urls.len();
    while to_receive > 0 {
        match rx.recv() {
            Ok(outcome) => {
                to_receive -= 1;
                results.pending.retain(|u| u != &outcome.url);
                if outcome.success {
                    results.success.push((outcome.url, outcome.message));
                } else {
                    results.failed.push((outcome.url, outcome.message));
                }
                status.append_snapshot(pass_name, urls.len(), &results);
            }
            Err(_) => {
                // All senders gone with results outstanding: a worker died
                // without reporting. Fail whatever is still pending.
                tracing::error!(
                    "worker result channel closed with {} outcome(s) outstanding",
                    to_receive
                );
                let remaining: Vec<String> = results.pending.drain(..).collect();
                for url in remaining {
                    results
                        .failed
                        .push((url, "worker terminated unexpectedly".to_string()));
                }
                status.append_snapshot(pass_name, urls.len(), &results);
                break;
            }
        }
    }

    for handle in handles {
        if let Err(e) = handle.join() {
            tracing::error!("worker panicked: {:?}", e);
        }
    }

    results
}

/// Aggressive retry pass: the same runner, re-invoked with harsher
/// parameters over exactly the URLs that failed the initial pass.
pub fn run_retry_pass(
    failed_urls: &[String],
    original_links: &[String],
    cfg: &HpcConfig,
    store: &StateStore,
    exec: &TransferExecutor,
    status: &mut StatusLog,
) -> BatchResults {
    tracing::info!(
        "aggressive retry for {} failed download(s) with {} workers",
        failed_urls.len(),
        cfg.retry_workers.max(1)
    );

    // Base curl options with only the overall time budget overridden.
    let options = CurlOptions::from_config(cfg)
        .with_max_time(Duration::from_secs(cfg.downloader_aggressive_timeout_seconds));
    let exec = exec.with_options(options);
    let policy = RetryPolicy::aggressive(cfg);

    let results = run_batch(
        failed_urls,
        original_links,
        cfg.retry_workers,
        &cfg.download_dir,
        store,
        &exec,
        policy,
        status,
        "Aggressive Retry Pass",
    );

    tracing::info!(
        "aggressive retry summary: {} succeeded, {} failed",
        results.success.len(),
        results.failed.len()
    );
    results
}
