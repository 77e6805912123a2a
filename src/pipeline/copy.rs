// src/pipeline/copy.rs

//! Change-filtered copy tasks (vendor, fonts, audio, video, misc).

use std::fs;

use anyhow::Context;
use tracing::debug;

use crate::config::PathEntry;
use crate::errors::Result;
use crate::pipeline::{freshness, sources};

/// What a copy task did: new/changed files copied, unchanged files left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub copied: usize,
    pub skipped: usize,
}

/// Copy every source matching the entry's glob into its destination
/// directory, skipping files whose destination is already up to date.
///
/// Skipping unchanged files keeps destination mtimes stable, which avoids
/// spurious downstream watch triggers.
pub fn run(entry: &PathEntry) -> Result<CopySummary> {
    let files = sources::matching_files(&entry.src)?;

    fs::create_dir_all(&entry.dest)
        .with_context(|| format!("creating destination {}", entry.dest.display()))?;

    let mut summary = CopySummary {
        copied: 0,
        skipped: 0,
    };

    for src in files {
        let Some(file_name) = src.file_name() else {
            continue;
        };
        let dest = entry.dest.join(file_name);

        if freshness::up_to_date(&src, &dest) {
            summary.skipped += 1;
            continue;
        }

        fs::copy(&src, &dest)
            .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;
        debug!(src = %src.display(), dest = %dest.display(), "copied file");
        summary.copied += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathEntry;

    fn entry_for(src: &str, dest: &str) -> PathEntry {
        toml::from_str(&format!("src = \"{src}\"\ndest = \"{dest}\"")).unwrap()
    }

    #[test]
    fn copies_new_files_and_skips_unchanged_ones() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let src_dir = tmp.path().join("fonts");
        let dest_dir = tmp.path().join("out");
        fs::create_dir_all(&src_dir)?;
        fs::write(src_dir.join("a.woff"), "aaaa")?;
        fs::write(src_dir.join("b.woff"), "bbbb")?;

        let entry = entry_for(
            &format!("{}/*", src_dir.display()),
            &dest_dir.display().to_string(),
        );

        let first = run(&entry)?;
        assert_eq!(first, CopySummary { copied: 2, skipped: 0 });
        assert!(dest_dir.join("a.woff").exists());

        let second = run(&entry)?;
        assert_eq!(second, CopySummary { copied: 0, skipped: 2 });
        Ok(())
    }
}
