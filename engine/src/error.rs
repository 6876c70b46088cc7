//! Error types for the backup engine.
//!
//! The primary error type is `BackupError`. Copy and upload failures are
//! scoped to a single save-state event: the dispatch loop logs them and keeps
//! watching. Watch and directory-creation failures are fatal and stop the
//! process.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::uploader::UploadError;

/// Errors that can occur while backing up save states.
///
/// `Copy` and `Upload` affect one event only and never stop the pipeline.
/// `Watch` and `CreateDir` mean no further events can be handled; callers
/// should exit non-zero. `is_fatal` encodes the split.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Failed to duplicate a save state into the backup directory
    #[error("Failed to copy save state {}: {}", .path.display(), .source)]
    Copy { path: PathBuf, source: io::Error },

    /// Failed to transmit a backup to remote storage; the local copy is kept
    #[error("Upload to {} failed: {} (local backup retained at {})", .destination, .source, .local.display())]
    Upload {
        destination: String,
        local: PathBuf,
        source: UploadError,
    },

    /// The filesystem notification mechanism failed to start or died
    #[error("Save state watcher failed: {reason}")]
    Watch { reason: String },

    /// Failed to create the backup directory
    #[error("Failed to create directory {}: {}", .path.display(), .source)]
    CreateDir { path: PathBuf, source: io::Error },
}

impl BackupError {
    /// Whether this error ends the watch loop (vs being logged and skipped).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Watch { .. } | Self::CreateDir { .. })
    }
}
