//! Filesystem operations module.
//!
//! This module provides the low-level operations the backup engine is built
//! on:
//! - Durable single-file copies (staged write, then atomic rename)
//! - Idempotent backup-directory creation

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::BackupError;

/// Extension appended to a backup file while its bytes are being staged.
const PARTIAL_SUFFIX: &str = ".part";

/// Copy a file into place durably.
///
/// The bytes are written to a sibling staging file ("{dst}.part"), flushed
/// to disk, then renamed onto `dst`. A failed copy never leaves a truncated
/// file under the final name; the staging file is removed before the error
/// is returned. The source modification time is preserved on a best-effort
/// basis.
///
/// # Arguments
/// * `src` - Source file path
/// * `dst` - Final destination path (parent directory must exist)
///
/// # Returns
/// Number of bytes copied
///
/// # Errors
/// Returns BackupError::Copy if any stage fails
pub fn copy_file_durable(src: &Path, dst: &Path) -> Result<u64, BackupError> {
    // Open the source first; a vanished source must not leave a staging file
    let mut src_file = fs::File::open(src).map_err(|e| BackupError::Copy {
        path: src.to_path_buf(),
        source: e,
    })?;

    let src_mtime = src_file.metadata().ok().and_then(|m| m.modified().ok());
    let partial = partial_path(dst);

    match stage_and_rename(&mut src_file, src, &partial, dst, src_mtime) {
        Ok(bytes_copied) => Ok(bytes_copied),
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

/// Write the source bytes to the staging file, flush, restamp, and rename.
fn stage_and_rename(
    src_file: &mut fs::File,
    src: &Path,
    partial: &Path,
    dst: &Path,
    src_mtime: Option<SystemTime>,
) -> Result<u64, BackupError> {
    let mut partial_file = fs::File::create(partial).map_err(|e| BackupError::Copy {
        path: partial.to_path_buf(),
        source: e,
    })?;

    // Copy file contents
    let bytes_copied = io::copy(src_file, &mut partial_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            BackupError::Copy {
                path: partial.to_path_buf(),
                source: e,
            }
        } else {
            BackupError::Copy {
                path: src.to_path_buf(),
                source: e,
            }
        }
    })?;

    // Flush to disk before the rename makes the copy visible
    partial_file.sync_all().map_err(|e| BackupError::Copy {
        path: partial.to_path_buf(),
        source: e,
    })?;
    drop(partial_file);

    // Preserve modification time if available
    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(partial, filetime::FileTime::from_system_time(mtime));
    }

    fs::rename(partial, dst).map_err(|e| BackupError::Copy {
        path: dst.to_path_buf(),
        source: e,
    })?;

    Ok(bytes_copied)
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Ensure a directory exists, creating it recursively if necessary.
///
/// # Arguments
/// * `dir` - Directory that should exist
///
/// # Errors
/// Returns BackupError::CreateDir if creation fails or the path exists but
/// is not a directory
pub fn ensure_dir_exists(dir: &Path) -> Result<(), BackupError> {
    match fs::metadata(dir) {
        Ok(metadata) => {
            if metadata.is_dir() {
                Ok(())
            } else {
                Err(BackupError::CreateDir {
                    path: dir.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "Path exists but is not a directory",
                    ),
                })
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| BackupError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
            Ok(())
        }
        Err(e) => Err(BackupError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}
