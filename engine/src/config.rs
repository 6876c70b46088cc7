//! Configuration loading and validation.
//!
//! The daemon is driven entirely by a TOML configuration file: which
//! directory to watch, where backups go, and whether (and how) to upload
//! them. Configuration is read once at startup and never reloaded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating the configuration file.
///
/// All of these are fatal: the process refuses to start watching on any of
/// them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Read { path: PathBuf, source: io::Error },

    /// The configuration file is not valid TOML
    #[error("Failed to parse config file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The configuration parsed but describes an unusable setup
    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Runtime configuration for the backup daemon.
///
/// Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    /// Directory the emulator writes save states into; must already exist
    pub watch_dir: PathBuf,

    /// Directory backup copies are written into; created at startup if missing
    pub backup_dir: PathBuf,

    /// Whether to transmit each backup to remote storage
    #[serde(default)]
    pub remote_upload: bool,

    /// Access token for the remote storage account
    pub remote_token: Option<String>,

    /// Remote folder backups are uploaded under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Upper bound on the duration of one upload request, in seconds
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

fn default_namespace() -> String {
    "PCSX2 Backups".to_string()
}

fn default_upload_timeout_secs() -> u64 {
    30
}

impl BackupConfig {
    /// Load and validate a configuration file.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Errors
    /// Returns ConfigError if the file cannot be read, is not valid TOML,
    /// or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: BackupConfig = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "watch_dir must not be empty".to_string(),
            });
        }

        if self.backup_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "backup_dir must not be empty".to_string(),
            });
        }

        if self.remote_upload {
            match &self.remote_token {
                Some(token) if !token.is_empty() => {}
                _ => {
                    return Err(ConfigError::Invalid {
                        reason: "remote_token is required when remote_upload is enabled"
                            .to_string(),
                    });
                }
            }

            if self.namespace.is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "namespace must not be empty when remote_upload is enabled"
                        .to_string(),
                });
            }

            if self.upload_timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    reason: "upload_timeout_secs must be greater than zero when remote_upload \
                             is enabled"
                        .to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("saveward.toml");
        fs::write(&path, contents).expect("Failed to write config");
        (temp_dir, path)
    }

    #[test]
    fn test_load_full_config() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            remote_upload = true
            remote_token = "tok_123"
            namespace = "My Backups"
            upload_timeout_secs = 10
            "#,
        );

        let config = BackupConfig::load(&path).expect("Failed to load config");
        assert_eq!(config.watch_dir, PathBuf::from("/saves"));
        assert_eq!(config.backup_dir, PathBuf::from("/backups"));
        assert!(config.remote_upload);
        assert_eq!(config.remote_token.as_deref(), Some("tok_123"));
        assert_eq!(config.namespace, "My Backups");
        assert_eq!(config.upload_timeout_secs, 10);
    }

    #[test]
    fn test_load_applies_defaults() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            "#,
        );

        let config = BackupConfig::load(&path).expect("Failed to load config");
        assert!(!config.remote_upload);
        assert!(config.remote_token.is_none());
        assert_eq!(config.namespace, "PCSX2 Backups");
        assert_eq!(config.upload_timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_missing_token_when_upload_enabled() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            remote_upload = true
            "#,
        );

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_rejects_empty_token_when_upload_enabled() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            remote_upload = true
            remote_token = ""
            "#,
        );

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_rejects_zero_upload_timeout() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            remote_upload = true
            remote_token = "tok_123"
            upload_timeout_secs = 0
            "#,
        );

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_rejects_empty_directories() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = ""
            backup_dir = "/backups"
            "#,
        );

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let (_guard, path) = write_config("watch_dir = [not toml");

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nonexistent.toml");

        let result = BackupConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_token_without_upload_is_allowed() {
        let (_guard, path) = write_config(
            r#"
            watch_dir = "/saves"
            backup_dir = "/backups"
            remote_token = "tok_123"
            "#,
        );

        let config = BackupConfig::load(&path).expect("Failed to load config");
        assert!(!config.remote_upload);
        assert_eq!(config.remote_token.as_deref(), Some("tok_123"));
    }
}
