//! Backup orchestration module.
//!
//! This module provides BackupEngine, which turns one save-state path into
//! one finished backup:
//! - Deriving the timestamped backup name (with collision handling)
//! - Performing the durable local copy
//! - Handing the copy to the remote uploader when one is configured

use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::config::BackupConfig;
use crate::error::BackupError;
use crate::fs_ops;
use crate::model::BackupRecord;
use crate::uploader::RemoteUploader;

/// Format of the timestamp prefixed to every backup name.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Orchestrates the two backup stages: durable local copy, optional upload.
///
/// One engine lives for the whole process. It holds no per-event state; each
/// call to `backup_save_state` is independent.
pub struct BackupEngine {
    backup_dir: PathBuf,
    namespace: String,
    uploader: Option<Box<dyn RemoteUploader>>,
}

impl BackupEngine {
    /// Create an engine from the loaded configuration.
    ///
    /// `uploader` is Some when remote upload is enabled; with None the
    /// engine performs local copies only.
    pub fn new(config: &BackupConfig, uploader: Option<Box<dyn RemoteUploader>>) -> Self {
        BackupEngine {
            backup_dir: config.backup_dir.clone(),
            namespace: config.namespace.clone(),
            uploader,
        }
    }

    /// Back up a single save state.
    ///
    /// Copies `source` into the backup directory under a timestamped name,
    /// then uploads the copy when an uploader is configured. The local copy
    /// is kept even when the upload fails. Source names that are not valid
    /// UTF-8 are carried over lossily.
    ///
    /// # Arguments
    /// * `source` - Path of the newly created save state
    ///
    /// # Returns
    /// A BackupRecord describing the local (and remote) location
    ///
    /// # Errors
    /// Returns BackupError::Copy if the local copy fails, or
    /// BackupError::Upload if the copy succeeded but the upload did not
    pub fn backup_save_state(&self, source: &Path) -> Result<BackupRecord, BackupError> {
        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BackupError::Copy {
                path: source.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "Source has no file name"),
            })?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let (backup_name, local_path) = self.next_free_slot(&timestamp, &original_name);

        let bytes_copied = fs_ops::copy_file_durable(source, &local_path)?;
        info!(
            "Backed up {} to {} ({} bytes)",
            original_name,
            local_path.display(),
            bytes_copied
        );

        let mut record = BackupRecord {
            original_name,
            timestamp,
            backup_name,
            local_path,
            remote_path: None,
        };

        if let Some(uploader) = &self.uploader {
            let destination = format!("/{}/{}", self.namespace, record.backup_name);
            if let Err(e) = uploader.upload(&record.local_path, &destination) {
                return Err(BackupError::Upload {
                    destination,
                    local: record.local_path,
                    source: e,
                });
            }
            info!("Uploaded {} to {}", record.backup_name, destination);
            record.remote_path = Some(destination);
        }

        Ok(record)
    }

    /// Pick the first backup name that does not collide with an existing file.
    ///
    /// Same-second events for the same source name get a numeric sequence
    /// inserted after the timestamp instead of overwriting an earlier backup.
    fn next_free_slot(&self, timestamp: &str, original_name: &str) -> (String, PathBuf) {
        let plain = format!("{}_{}", timestamp, original_name);
        let plain_path = self.backup_dir.join(&plain);
        if !plain_path.exists() {
            return (plain, plain_path);
        }

        let mut n = 1u32;
        loop {
            let candidate = format!("{}-{}_{}", timestamp, n, original_name);
            let candidate_path = self.backup_dir.join(&candidate);
            if !candidate_path.exists() {
                return (candidate, candidate_path);
            }
            n += 1;
        }
    }
}
