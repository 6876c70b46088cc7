//! # SaveWard Engine - Save State Backup Library
//!
//! A headless engine for preserving emulator save states as they are
//! written. Designed as the foundation for the `saveward` daemon, but usable
//! from any embedding process.
//!
//! ## Overview
//!
//! The engine watches a directory for newly created save-state files and
//! preserves each one with a timestamped local copy and an optional remote
//! upload. It features:
//! - Creation-event watching behind a channel seam (decoupled from the
//!   platform notifier)
//! - Timestamped, collision-safe backup naming
//! - Durable local copies (staged write, then atomic rename)
//! - Optional upload to remote storage via a pluggable trait
//! - Per-event error isolation
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{BackupConfig, BackupEngine};
//! use engine::watcher::{dispatch_events, watch_directory};
//! use crossbeam_channel::bounded;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration and prepare the backup directory
//! let config = BackupConfig::load("saveward.toml")?;
//! engine::fs_ops::ensure_dir_exists(&config.backup_dir)?;
//!
//! // Wire the pipeline: watcher -> dispatch loop -> engine
//! let engine = BackupEngine::new(&config, None);
//! let (_guard, events) = watch_directory(&config.watch_dir)?;
//!
//! // The embedding process signals shutdown (e.g. on Ctrl-C)
//! let (shutdown_tx, shutdown_rx) = bounded(1);
//! # let _ = shutdown_tx;
//! dispatch_events(&events, &shutdown_rx, &engine)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (SaveStateEvent, BackupRecord)
//! - **error**: Error types and handling
//! - **config**: TOML configuration loading and validation
//! - **fs_ops**: Low-level filesystem operations
//! - **backup**: Backup orchestration (naming, copy, upload)
//! - **uploader**: Remote upload trait and the Dropbox client
//! - **watcher**: Filesystem watching and event dispatch

pub mod backup;
pub mod config;
pub mod error;
pub mod fs_ops;
pub mod model;
pub mod uploader;
pub mod watcher;

// Re-export main types and functions
pub use backup::BackupEngine;
pub use config::{BackupConfig, ConfigError};
pub use error::BackupError;
pub use model::{BackupRecord, SaveStateEvent};
pub use uploader::{DropboxUploader, RemoteUploader, UploadError};
pub use watcher::{dispatch_events, watch_directory, WatchEvent, WatchGuard};
