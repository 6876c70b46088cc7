//! Remote upload trait and the Dropbox implementation.
//!
//! This module defines the RemoteUploader trait, which decouples the backup
//! engine from any specific storage provider. The engine calls it after each
//! successful local copy; a failed upload never undoes the local backup.

use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Dropbox content endpoint for single-request file uploads.
const UPLOAD_URL: &str = "https://content.dropboxapi.com/2/files/upload";

/// An upload failure, as reported by the storage client.
///
/// Deliberately opaque: network faults, authentication problems, quota
/// exhaustion and local read failures all surface here. Callers treat every
/// upload failure the same way.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UploadError(pub String);

/// Trait for transmitting a finished backup to remote storage.
///
/// Implementations are called synchronously from the dispatch loop and
/// should bound their own request time.
pub trait RemoteUploader: Send {
    /// Transmit the file at `local_path` to `destination`.
    ///
    /// `destination` is the full remote object path, e.g.
    /// "/PCSX2 Backups/20240115_143052_slot1.p2s".
    fn upload(&self, local_path: &Path, destination: &str) -> Result<(), UploadError>;
}

/// Uploads backups to a Dropbox account via the HTTP content API.
pub struct DropboxUploader {
    client: reqwest::blocking::Client,
    token: String,
}

impl DropboxUploader {
    /// Create a Dropbox uploader.
    ///
    /// # Arguments
    /// * `token` - OAuth2 access token for the Dropbox account
    /// * `timeout` - Upper bound on the duration of one upload request
    ///
    /// # Errors
    /// Returns UploadError if the HTTP client cannot be constructed
    pub fn new(token: String, timeout: Duration) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(DropboxUploader { client, token })
    }
}

impl RemoteUploader for DropboxUploader {
    fn upload(&self, local_path: &Path, destination: &str) -> Result<(), UploadError> {
        let bytes = fs::read(local_path)
            .map_err(|e| UploadError(format!("Failed to read {}: {}", local_path.display(), e)))?;

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", api_arg(destination))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .map_err(|e| UploadError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        Ok(())
    }
}

/// Build the `Dropbox-API-Arg` header value for an upload.
///
/// Dropbox only accepts ASCII in this header, while the serialized JSON
/// carries raw UTF-8. Characters above 0x7f are rewritten as \uXXXX
/// escapes, using surrogate pairs where one code unit is not enough.
fn api_arg(destination: &str) -> String {
    let raw = serde_json::json!({
        "path": destination,
        "mode": "add",
        "autorename": false,
        "mute": false,
    })
    .to_string();

    let mut escaped = String::with_capacity(raw.len());
    let mut units = [0u16; 2];
    for c in raw.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            for &unit in c.encode_utf16(&mut units).iter() {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}
