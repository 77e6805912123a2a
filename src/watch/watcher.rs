// src/watch/watcher.rs

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::watch::cache::FileCache;
use crate::watch::event_handler::{process_file_change, TaskHashes};
use crate::watch::patterns::TaskWatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes the source directory
/// recursively and sends `RuntimeEvent::TaskTriggered` for tasks whose
/// patterns match a changed path.
///
/// - `project_root` is the directory against which all glob patterns are
///   evaluated (normally the working directory).
/// - `watch_dir` is the source tree to observe; deliberately NOT the
///   project root, so writes into the build output never feed back into
///   the watcher.
/// - `profiles` is the compiled per-task pattern set.
/// - `runtime_tx` is the channel into the main runtime.
pub fn spawn_watcher(
    project_root: impl Into<PathBuf>,
    watch_dir: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let project_root = project_root.into();
    // Canonicalize once so we have a stable base path.
    let project_root = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.clone());
    let watch_dir = watch_dir.into();

    let profiles = Arc::new(profiles);

    // Dependency map so the event handler can reason about ancestors.
    let dep_map: HashMap<String, Vec<String>> = profiles
        .iter()
        .map(|p| (p.name().to_string(), p.deps().to_vec()))
        .collect();
    let dep_map = Arc::new(dep_map);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fall back to stderr.
                    eprintln!("assetpipe: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("assetpipe: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", watch_dir);

    // Async task that consumes notify events and forwards task triggers to
    // the runtime.
    let async_root = project_root.clone();
    let async_watch_dir = watch_dir.clone();
    let async_profiles = Arc::clone(&profiles);
    let async_dep_map = Arc::clone(&dep_map);

    tokio::spawn(async move {
        let file_cache = Arc::new(Mutex::new(FileCache::new()));
        let task_hashes = Arc::new(Mutex::new(TaskHashes::new()));

        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for path in event.paths {
                process_file_change(
                    &async_root,
                    &async_watch_dir,
                    &path,
                    &async_profiles,
                    &async_dep_map,
                    &runtime_tx,
                    Arc::clone(&task_hashes),
                    Arc::clone(&file_cache),
                )
                .await;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
