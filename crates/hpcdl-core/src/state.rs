//! Per-file state markers: the resume mechanism across process restarts.
//!
//! One flat file per target filename under `<download_dir>/download_state/`,
//! holding the literal text `COMPLETED` or `FAILED: <reason>`. Overwritten
//! on every terminal outcome; only the latest status is kept.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Subdirectory of the download dir holding the markers.
pub const STATE_DIR_NAME: &str = "download_state";

/// Last recorded terminal state of a target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    /// No marker (or an unreadable/garbled one): the file was never finished.
    Absent,
    /// A prior attempt completed; the driver skips the file entirely.
    Completed,
    /// The last attempt run exhausted its retries.
    Failed(String),
}

/// File-backed store of per-file markers.
///
/// Cloneable so each worker can carry a handle; workers touch disjoint
/// marker paths, so no locking is needed.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Opens the store under `download_dir`, creating the marker directory.
    pub fn open(download_dir: &Path) -> io::Result<Self> {
        let dir = download_dir.join(STATE_DIR_NAME);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the marker for `filename`.
    pub fn marker_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{filename}.state"))
    }

    /// Reads the marker. Read failures and unrecognized content map to
    /// `Absent` so a damaged marker causes a re-download, never a crash.
    pub fn read(&self, filename: &str) -> FileState {
        let content = match fs::read_to_string(self.marker_path(filename)) {
            Ok(c) => c,
            Err(_) => return FileState::Absent,
        };
        let status = content.trim();
        if status == "COMPLETED" {
            FileState::Completed
        } else if let Some(reason) = status.strip_prefix("FAILED:") {
            FileState::Failed(reason.trim().to_string())
        } else {
            FileState::Absent
        }
    }

    /// Overwrites the marker. Best-effort: a write failure is logged and
    /// swallowed, it must never escalate past the driver.
    pub fn write(&self, filename: &str, state: &FileState) {
        let content = match state {
            FileState::Completed => "COMPLETED".to_string(),
            FileState::Failed(reason) => format!("FAILED: {reason}"),
            FileState::Absent => return,
        };
        let path = self.marker_path(filename);
        if let Err(e) = fs::write(&path, content) {
            tracing::warn!("could not write state marker {}: {}", path.display(), e);
        }
    }
}
