//! Logging init: timestamped stderr output, flushed per event.
//!
//! Batch schedulers capture stderr to the job log, so stderr is the right
//! sink for tailing; the durable per-job record is the status file.

use tracing_subscriber::EnvFilter;

/// Initialize structured logging to stderr (no ANSI, suitable for job logs).
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hpcdl_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
