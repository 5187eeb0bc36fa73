//! Links-file loading: one URL per line, blank lines ignored.

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Fatal problems with the links file. The job cannot start without input.
#[derive(Debug, Error)]
pub enum LinksError {
    #[error("could not read links file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no links found in {path}")]
    Empty { path: String },
}

/// Load the ordered URL list from a line-delimited text file.
///
/// Lines are trimmed and blank lines skipped. The returned order is the
/// order in the file; fallback filenames are derived from it, so it must
/// be preserved.
pub fn load_links(path: &Path) -> Result<Vec<String>, LinksError> {
    let data = fs::read_to_string(path).map_err(|source| LinksError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let links: Vec<String> = data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if links.is_empty() {
        return Err(LinksError::Empty {
            path: path.display().to_string(),
        });
    }

    tracing::info!("loaded {} URLs from {}", links.len(), path.display());
    Ok(links)
}
