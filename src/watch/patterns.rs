// src/watch/patterns.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::engine::TaskName;
use crate::tasks::{TaskSpec, REGISTRY};
use crate::watch::path_utils::relative_str;

/// Compiled watch glob patterns for a single task.
///
/// The patterns are relative to the project root; the watcher passes
/// relative paths (e.g. `"dev/styles/main.css"`) into `matches`.
#[derive(Clone)]
pub struct TaskWatchProfile {
    name: TaskName,
    /// Direct dependencies (`after`) of this task.
    deps: Vec<TaskName>,
    watch_set: GlobSet,
    use_hash: bool,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct dependencies for this task; the watcher uses these to find
    /// ancestor relationships for a changed path.
    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }

    /// Whether this task skips triggers when its watched content's
    /// aggregate hash is unchanged.
    pub fn use_hash(&self) -> bool {
        self.use_hash
    }

    /// Returns true if this task is interested in the given path (relative
    /// to the project root).
    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
    }
}

/// Build a compiled watch profile for every task with at least one watch
/// glob. A task watches the union of the `watch` lists of the path-table
/// entries it reads.
pub fn build_profiles_from_config(config: &ConfigFile) -> Result<Vec<TaskWatchProfile>> {
    build_profiles(config, REGISTRY)
}

fn build_profiles(config: &ConfigFile, specs: &[TaskSpec]) -> Result<Vec<TaskWatchProfile>> {
    let mut profiles = Vec::new();

    for spec in specs {
        let mut patterns: Vec<&str> = Vec::new();
        for category in spec.categories() {
            if let Some(entry) = config.paths().get(&category) {
                patterns.extend(entry.watch.iter().map(String::as_str));
            }
        }

        if patterns.is_empty() {
            continue;
        }

        let watch_set = build_globset(&patterns)
            .with_context(|| format!("building watch globset for task {}", spec.name))?;

        profiles.push(TaskWatchProfile {
            name: spec.name.to_string(),
            deps: spec.after.iter().map(|s| s.to_string()).collect(),
            watch_set,
            use_hash: config.runner.use_hash,
        });
    }

    Ok(profiles)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `watch_dir` that match this task's patterns.
///
/// Used when computing aggregated hashes for `use_hash` tasks. Paths are
/// matched relative to `project_root`.
pub fn collect_matching_files(
    project_root: &Path,
    watch_dir: &Path,
    profile: &TaskWatchProfile,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![watch_dir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for dir_entry in fs::read_dir(&dir)
            .with_context(|| format!("reading watched directory {}", dir.display()))?
        {
            let path = dir_entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let rel = relative_str(project_root, &path)
                    .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));
                if profile.matches(&rel) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_and_validate_str;

    #[test]
    fn default_profiles_cover_styles_scripts_and_html() {
        let config = load_and_validate_str("").unwrap();
        let profiles = build_profiles_from_config(&config).unwrap();

        let names: Vec<&str> = profiles.iter().map(|p| p.name()).collect();
        assert!(names.contains(&"styles"));
        assert!(names.contains(&"scripts"));
        assert!(names.contains(&"html"));
        // Copy tasks have no watch globs by default.
        assert!(!names.contains(&"fonts"));
    }

    #[test]
    fn styles_profile_matches_nested_stylesheets() {
        let config = load_and_validate_str("").unwrap();
        let profiles = build_profiles_from_config(&config).unwrap();
        let styles = profiles.iter().find(|p| p.name() == "styles").unwrap();

        assert!(styles.matches("dev/styles/styles.css"));
        assert!(styles.matches("dev/styles/components/card.css"));
        assert!(!styles.matches("dev/scripts/scripts.js"));
    }
}
