// src/pipeline/sources.rs

//! Source file enumeration for the path table's globs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobMatcher};

use crate::errors::{AssetpipeError, Result};

/// Expand a source glob (relative to the project root) into the sorted list
/// of matching files.
///
/// The non-glob prefix of the pattern must name an existing, readable
/// directory; that failing is the one fatal condition for copy-style tasks.
/// A readable directory with zero matches is fine and yields an empty list.
pub fn matching_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = compile(pattern)?;
    let base = base_dir(pattern);

    // A pattern without glob metacharacters names a concrete file.
    if base.is_file() {
        return Ok(vec![base]);
    }

    if !base.is_dir() {
        return Err(AssetpipeError::ConfigError(format!(
            "source path {} does not exist (pattern {pattern})",
            base.display()
        )));
    }

    let mut out = Vec::new();
    walk(&base, &matcher, &mut out)
        .with_context(|| format!("reading source directory {}", base.display()))?;
    out.sort();
    Ok(out)
}

/// Resolve a pattern that is expected to name exactly one entry file
/// (stylesheet entry, script entry).
pub fn entry_file(pattern: &str) -> Result<PathBuf> {
    let files = matching_files(pattern)?;
    match files.into_iter().next() {
        Some(file) => Ok(file),
        None => Err(AssetpipeError::ConfigError(format!(
            "no file matches the entry pattern {pattern}"
        ))),
    }
}

/// The non-glob directory prefix of a pattern, e.g. `dev/media/svg` for
/// `dev/media/svg/*.svg`.
pub fn base_dir(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    if pattern.starts_with('/') {
        base.push("/");
    }
    for component in pattern.split('/') {
        if component.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component);
    }
    if base.as_os_str().is_empty() {
        base.push(".");
    }
    base
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern).map_err(|e| {
        AssetpipeError::ConfigError(format!("invalid source glob {pattern}: {e}"))
    })?;
    Ok(glob.compile_matcher())
}

fn walk(dir: &Path, matcher: &GlobMatcher, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.is_dir() {
            walk(&path, matcher, out)?;
        } else if matcher.is_match(&path) {
            out.push(path);
        }
    }
    Ok(())
}
