//! CLI for the hpcdl batch download orchestrator.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use hpcdl_core::status::STATUS_FILE_NAME;
use hpcdl_core::{config, job, links};

/// Batch file-download orchestrator for HPC/cluster batch jobs.
///
/// Reads a line-delimited URL list, downloads every file with bounded
/// concurrency and layered retries, then verifies the results. The exit
/// status is non-zero only for configuration or input errors; permanently
/// failed downloads are reported in the log and status file.
#[derive(Debug, Parser)]
#[command(name = "hpcdl")]
#[command(about = "Batch download orchestrator for HPC batch jobs", long_about = None)]
pub struct Cli {
    /// Line-delimited list of URLs to download.
    #[arg(default_value = "download_links.txt")]
    pub links_file: PathBuf,

    /// TOML config file (built-in defaults are used when absent).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured download directory.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Override the configured worker-pool size for the initial pass.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.download_dir {
        cfg.download_dir = dir;
    }
    if let Some(workers) = cli.workers {
        cfg.max_concurrent_downloads = workers;
    }
    tracing::debug!("effective config: {:?}", cfg);

    let urls = links::load_links(&cli.links_file)?;
    let report = job::run(&cfg, &urls)?;

    if !report.results.failed.is_empty() {
        tracing::warn!(
            "{} download(s) permanently failed, see {} for details",
            report.results.failed.len(),
            cfg.download_dir.join(STATUS_FILE_NAME).display()
        );
    }
    Ok(())
}
