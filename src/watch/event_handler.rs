// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::cache::FileCache;
use crate::watch::dag_filter::has_ancestor_in_matching;
use crate::watch::hash::compute_aggregate_hash;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{collect_matching_files, TaskWatchProfile};

/// Last known aggregate hash per task, kept for the lifetime of the watcher.
pub type TaskHashes = HashMap<String, String>;

/// Process a single file change event and trigger appropriate tasks.
///
/// This function:
/// 1. Finds all tasks whose patterns match the changed path
/// 2. Applies DAG-aware filtering to trigger only root tasks
/// 3. Applies hash-based filtering if enabled
/// 4. Sends trigger events to the runtime
#[allow(clippy::too_many_arguments)]
pub async fn process_file_change(
    project_root: &Path,
    watch_dir: &Path,
    path: &Path,
    profiles: &Arc<Vec<TaskWatchProfile>>,
    dep_map: &Arc<HashMap<String, Vec<String>>>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    task_hashes: Arc<Mutex<TaskHashes>>,
    file_cache: Arc<Mutex<FileCache>>,
) {
    let rel_str = match relative_str(project_root, path) {
        Some(s) => s,
        None => {
            warn!(
                "could not relativize path {:?} against root {:?}",
                path, project_root
            );
            return;
        }
    };

    debug!(?path, rel = %rel_str, "normalized event path");

    // 1) Find all tasks whose watch patterns match this path.
    let matching_profiles: Vec<&TaskWatchProfile> =
        profiles.iter().filter(|p| p.matches(&rel_str)).collect();

    if matching_profiles.is_empty() {
        return;
    }

    // 2) Build a set of their names so we can check ancestors.
    let matching_names: HashSet<String> = matching_profiles
        .iter()
        .map(|p| p.name().to_string())
        .collect();

    // 3) Keep only those tasks that do NOT have any ancestor also in
    //    `matching_names`. These are the "roots for this path".
    let mut root_profiles: Vec<&TaskWatchProfile> = Vec::new();
    for profile in matching_profiles {
        if !has_ancestor_in_matching(profile.name(), &matching_names, dep_map) {
            root_profiles.push(profile);
        }
    }

    if root_profiles.is_empty() {
        return;
    }

    let trigger_names: Vec<&str> = root_profiles.iter().map(|p| p.name()).collect();
    debug!(
        rel = %rel_str,
        ?trigger_names,
        "DAG-aware filter: triggering only root tasks for this path"
    );

    // 4) For each selected task, apply optional hash-based content change
    //    detection and emit a trigger.
    for profile in root_profiles {
        if should_trigger_task(
            project_root,
            watch_dir,
            path,
            &rel_str,
            profile,
            Arc::clone(&task_hashes),
            Arc::clone(&file_cache),
        )
        .await
        {
            let task_name = profile.name().to_string();
            debug!(task = %task_name, path = %rel_str, "watch match -> triggering task");
            if let Err(err) = runtime_tx
                .send(RuntimeEvent::TaskTriggered {
                    task: task_name,
                    reason: TriggerReason::FileWatch,
                })
                .await
            {
                warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
                // If the runtime channel is closed, there's no point
                // keeping the watcher loop alive.
                return;
            }
        }
    }
}

/// Check if a task should be triggered based on hash comparison.
///
/// Returns true if the task should be triggered, false if it should be
/// skipped because the aggregated watched content is unchanged.
async fn should_trigger_task(
    project_root: &Path,
    watch_dir: &Path,
    abs_path: &Path,
    rel_path: &str,
    profile: &TaskWatchProfile,
    task_hashes: Arc<Mutex<TaskHashes>>,
    file_cache: Arc<Mutex<FileCache>>,
) -> bool {
    let task_name = profile.name().to_string();

    // If use_hash is not enabled, always trigger.
    if !profile.use_hash() {
        return true;
    }

    let project_root = project_root.to_path_buf();
    let watch_dir = watch_dir.to_path_buf();
    let abs_path = abs_path.to_path_buf();
    let profile = profile.clone();
    let rel_path = rel_path.to_string();

    tokio::task::spawn_blocking(move || {
        // Only trigger when the aggregated contents of all watched files
        // for this task actually change.
        let mut files: Vec<PathBuf> =
            match collect_matching_files(&project_root, &watch_dir, &profile) {
                Ok(f) => f,
                Err(err) => {
                    warn!(
                        task = %task_name,
                        error = %err,
                        "failed to collect watched files; triggering anyway"
                    );
                    return true;
                }
            };
        files.sort();

        let mut cache = match file_cache.lock() {
            Ok(g) => g,
            Err(_) => {
                warn!("file cache mutex poisoned; triggering anyway");
                return true;
            }
        };
        cache.invalidate(&abs_path);

        let mut file_hashes = Vec::with_capacity(files.len());
        for file_path in files {
            match cache.get_or_compute(&file_path) {
                Ok(h) => file_hashes.push(h),
                Err(err) => {
                    warn!(
                        task = %task_name,
                        file = ?file_path,
                        error = %err,
                        "failed to compute file hash; triggering anyway"
                    );
                    return true;
                }
            }
        }
        drop(cache);

        let new_hash = compute_aggregate_hash(&file_hashes);

        let mut hashes = match task_hashes.lock() {
            Ok(guard) => guard,
            Err(_poisoned) => {
                warn!(task = %task_name, "task hash mutex poisoned; triggering anyway");
                return true;
            }
        };

        match hashes.get(&task_name) {
            Some(old_hash) if *old_hash == new_hash => {
                info!(
                    task = %task_name,
                    path = %rel_path,
                    "watched content unchanged; skipping trigger"
                );
                false
            }
            _ => {
                hashes.insert(task_name, new_hash);
                true
            }
        }
    })
    .await
    .unwrap_or(true) // If the blocking task panics, default to triggering.
}
