//! Core data model for the backup pipeline.
//!
//! This module defines the data structures flowing through the pipeline:
//! - SaveStateEvent: a single filesystem creation notification
//! - BackupRecord: the outcome of one completed backup

use std::path::PathBuf;

/// A single filesystem creation notification from the watched directory.
///
/// Produced by the watcher bridge for every creation event, before any
/// filtering. Directories and non-save-state files are discarded by the
/// dispatch loop, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStateEvent {
    /// Full path of the created entry
    pub path: PathBuf,

    /// True if the created entry is a directory
    pub is_dir: bool,
}

/// The outcome of one successful backup operation.
///
/// Describes where the save state ended up, locally and (when upload is
/// enabled) remotely. Records are returned for diagnostics; they are never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Base name of the source file (e.g. "slot1.p2s")
    pub original_name: String,

    /// Capture time formatted as YYYYMMDD_HHMMSS, local time
    pub timestamp: String,

    /// Backup file name: "{timestamp}_{original_name}", with a numeric
    /// suffix after the timestamp when a same-second collision occurred
    pub backup_name: String,

    /// Full path of the local backup copy
    pub local_path: PathBuf,

    /// Remote object path ("/{namespace}/{backup_name}") if uploaded
    pub remote_path: Option<String>,
}

impl BackupRecord {
    /// Returns true if this backup was also transmitted to remote storage.
    pub fn uploaded(&self) -> bool {
        self.remote_path.is_some()
    }
}
