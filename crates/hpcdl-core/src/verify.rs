//! Post-hoc verification: size heuristics only, never fatal.

use std::fs;
use std::path::Path;

use crate::url_model::target_filename;

/// Files smaller than this are flagged as suspicious for this workload.
const SUSPICIOUS_SIZE_BYTES: u64 = 1024 * 1024;

/// Checks every expected payload for existence and plausible size.
///
/// Flags missing, zero-size, and suspiciously small files in the log.
/// Returns false when any issue was found; callers report but do not
/// change the process exit status on that.
pub fn verify_downloads(download_dir: &Path, links: &[String]) -> bool {
    tracing::info!("verifying downloaded files");

    let mut missing = Vec::new();
    let mut zero_size = Vec::new();
    let mut suspicious = Vec::new();

    for url in links {
        let filename = target_filename(url, links);
        let path = download_dir.join(&filename);
        match fs::metadata(&path) {
            Err(_) => missing.push((filename, url)),
            Ok(meta) if meta.len() == 0 => zero_size.push((filename, url)),
            Ok(meta) if meta.len() < SUSPICIOUS_SIZE_BYTES => {
                suspicious.push((filename, meta.len(), url))
            }
            Ok(_) => {}
        }
    }

    if missing.is_empty() && zero_size.is_empty() && suspicious.is_empty() {
        tracing::info!("all files appear to be downloaded correctly");
        return true;
    }

    tracing::warn!("issues found with downloads:");
    for (filename, url) in &missing {
        tracing::warn!("  missing: {} ({})", filename, url);
    }
    for (filename, url) in &zero_size {
        tracing::warn!("  zero size: {} ({})", filename, url);
    }
    for (filename, size, url) in &suspicious {
        tracing::warn!(
            "  suspiciously small: {}: {:.2} KB ({})",
            filename,
            *size as f64 / 1024.0,
            url
        );
    }
    false
}
