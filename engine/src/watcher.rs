//! Filesystem watching and event dispatch.
//!
//! This module has two halves. `watch_directory` bridges the platform file
//! notifier into a bounded channel of WatchEvents, which decouples the rest
//! of the pipeline from the notification technology. `dispatch_events`
//! consumes that channel: it filters out everything that is not a newly
//! created save state and drives the BackupEngine, one event at a time, in
//! delivery order.

use std::path::Path;

use crossbeam_channel::{bounded, select, Receiver, TryRecvError};
use notify::event::CreateKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::backup::BackupEngine;
use crate::error::BackupError;
use crate::model::SaveStateEvent;

/// File extension that marks an emulator save state.
const SAVE_STATE_EXT: &str = ".p2s";

/// Capacity of the bridge channel between the notifier and the dispatch loop.
const EVENT_QUEUE_CAPACITY: usize = 128;

/// One message from the watcher bridge to the dispatch loop.
#[derive(Debug)]
pub enum WatchEvent {
    /// A filesystem entry was created in the watched directory
    Created(SaveStateEvent),

    /// An error reported by the underlying notifier; treated as fatal
    WatchFailed(String),
}

/// Keeps the filesystem subscription alive.
///
/// Dropping the guard stops the underlying notifier; the event channel
/// disconnects once the bridge side is gone.
pub struct WatchGuard {
    _watcher: RecommendedWatcher,
}

/// Start watching a directory for newly created entries.
///
/// The subscription is non-recursive and forwards creation events only;
/// modifications, removals and renames never reach the channel. The bridge
/// blocks when the channel is full, stalling the notifier until the dispatch
/// loop catches up.
///
/// # Arguments
/// * `dir` - Directory to watch; must already exist
///
/// # Returns
/// The guard keeping the subscription alive and the event receiver
///
/// # Errors
/// Returns BackupError::Watch if the notifier cannot be started or the
/// directory cannot be watched
pub fn watch_directory(dir: &Path) -> Result<(WatchGuard, Receiver<WatchEvent>), BackupError> {
    let (tx, rx) = bounded(EVENT_QUEUE_CAPACITY);

    let mut watcher =
        notify::recommended_watcher(move |result: Result<Event, notify::Error>| match result {
            Ok(event) => {
                if let EventKind::Create(kind) = event.kind {
                    for path in event.paths {
                        let is_dir = match kind {
                            CreateKind::File => false,
                            CreateKind::Folder => true,
                            // Some platforms only report an unspecific kind
                            _ => path.is_dir(),
                        };
                        let _ = tx.send(WatchEvent::Created(SaveStateEvent { path, is_dir }));
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatchEvent::WatchFailed(e.to_string()));
            }
        })
        .map_err(|e| BackupError::Watch {
            reason: e.to_string(),
        })?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| BackupError::Watch {
            reason: e.to_string(),
        })?;

    Ok((WatchGuard { _watcher: watcher }, rx))
}

/// Whether a creation event refers to a save state worth backing up.
///
/// Directories are discarded; file names must carry the exact, case
/// sensitive extension. The comparison is byte-wise, so names that are
/// not valid UTF-8 still match.
fn qualifies(event: &SaveStateEvent) -> bool {
    if event.is_dir {
        return false;
    }
    event
        .path
        .file_name()
        .map(|n| n.as_encoded_bytes().ends_with(SAVE_STATE_EXT.as_bytes()))
        .unwrap_or(false)
}

/// Consume watch events and back up every qualifying save state.
///
/// Events are handled strictly in delivery order. A copy or upload failure
/// is logged and the loop moves on to the next event; a notifier failure or
/// a disconnected event channel ends the loop with an error. A message (or
/// disconnect) on `shutdown` ends the loop cleanly once the in-flight event
/// is finished.
///
/// # Arguments
/// * `events` - Receiver side of the bridge started by `watch_directory`
/// * `shutdown` - Signalled when the process should stop watching
/// * `engine` - Engine performing the actual backups
///
/// # Errors
/// Returns BackupError::Watch when no further events can be observed
pub fn dispatch_events(
    events: &Receiver<WatchEvent>,
    shutdown: &Receiver<()>,
    engine: &BackupEngine,
) -> Result<(), BackupError> {
    loop {
        // Checked between events so a backlog cannot delay shutdown
        match shutdown.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => return Ok(()),
            Err(TryRecvError::Empty) => {}
        }

        select! {
            recv(shutdown) -> _ => return Ok(()),
            recv(events) -> msg => match msg {
                Ok(WatchEvent::Created(event)) => {
                    if !qualifies(&event) {
                        continue;
                    }
                    info!("New save state detected: {}", event.path.display());
                    match engine.backup_save_state(&event.path) {
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => error!("{}", e),
                    }
                }
                Ok(WatchEvent::WatchFailed(reason)) => {
                    return Err(BackupError::Watch { reason });
                }
                Err(_) => {
                    return Err(BackupError::Watch {
                        reason: "event channel closed".to_string(),
                    });
                }
            },
        }
    }
}
