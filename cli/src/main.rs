//! SaveWard - Save state backup daemon.
//!
//! Watches an emulator save directory and preserves every newly written save
//! state with a timestamped local copy, optionally uploading each one to
//! Dropbox. This binary wires configuration, logging, signal handling and
//! the watch loop together; the backup logic lives in the engine crate.

use clap::Parser;
use crossbeam_channel::bounded;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use engine::watcher::{dispatch_events, watch_directory};
use engine::{fs_ops, BackupConfig, BackupEngine, DropboxUploader, RemoteUploader};

/// SaveWard - emulator save state backup daemon
#[derive(Parser, Debug)]
#[command(name = "saveward")]
#[command(version = "0.1.0")]
#[command(about = "Back up emulator save states as they are written")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, value_name = "PATH", default_value = "saveward.toml")]
    config: PathBuf,
}

/// Install the global tracing subscriber; RUST_LOG overrides the default.
fn init_logging() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Parse arguments, run the daemon, and map the outcome to an exit code
fn main() {
    let args = Args::parse();
    init_logging();

    let exit_code = match run_daemon(&args) {
        Ok(()) => 0,
        Err(msg) => {
            error!("{}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main daemon logic - separated for testability
fn run_daemon(args: &Args) -> Result<(), String> {
    let config = BackupConfig::load(&args.config).map_err(|e| e.to_string())?;

    fs_ops::ensure_dir_exists(&config.backup_dir).map_err(|e| e.to_string())?;

    let uploader = build_uploader(&config)?;
    let engine = BackupEngine::new(&config, uploader);

    let (guard, events) = watch_directory(&config.watch_dir).map_err(|e| e.to_string())?;

    // The handler keeps its sender alive for the life of the process, so the
    // shutdown channel can never disconnect while the loop runs
    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| format!("Failed to install Ctrl-C handler: {}", e))?;

    info!(
        "Monitoring {} for new save states (press Ctrl+C to stop)",
        config.watch_dir.display()
    );

    dispatch_events(&events, &shutdown_rx, &engine).map_err(|e| e.to_string())?;

    drop(guard);
    info!("Shutdown complete");
    Ok(())
}

/// Build the remote uploader when remote upload is enabled.
fn build_uploader(config: &BackupConfig) -> Result<Option<Box<dyn RemoteUploader>>, String> {
    if !config.remote_upload {
        return Ok(None);
    }

    let token = config
        .remote_token
        .clone()
        .ok_or_else(|| "remote_token is required when remote_upload is enabled".to_string())?;

    let uploader = DropboxUploader::new(token, Duration::from_secs(config.upload_timeout_secs))
        .map_err(|e| e.to_string())?;

    Ok(Some(Box::new(uploader)))
}
