// src/watch.rs

//! Config file watching.
//!
//! Watches the directory containing the config file (editors typically
//! replace the file rather than writing in place, so watching the file
//! itself would lose the watch on the first save) and forwards a
//! [`RuntimeEvent::ConfigChanged`] whenever an event touches the config
//! path. The runtime keeps the watcher alive across disable/enable
//! cycles, so fixing a broken config recovers automatically.

use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::errors::Result;

/// Handle for the config watcher.
///
/// Exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping it stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher for the config file.
pub fn spawn_config_watcher(
    config_path: &Path,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let config_path = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());
    let watch_dir = parent_dir(&config_path);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("cleaver: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("cleaver: file watch error: {err}");
            }
        },
        Config::default(),
    )
    .map_err(|err| crate::errors::CleaverError::Other(err.into()))?;

    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|err| crate::errors::CleaverError::Other(err.into()))?;

    info!("config watcher started on {:?}", watch_dir);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !event.paths.iter().any(|p| p == &config_path) {
                continue;
            }
            debug!(?event, "config file event");
            if runtime_tx.send(RuntimeEvent::ConfigChanged).await.is_err() {
                break;
            }
        }
        debug!("config watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
