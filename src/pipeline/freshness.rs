// src/pipeline/freshness.rs

//! Modification-time freshness checks for change-filtered tasks.

use std::fs;
use std::path::Path;

/// Returns `true` when `dest` exists and is at least as new as `src`.
///
/// Any metadata error (missing file, unsupported mtime) counts as stale,
/// so the worst case is a redundant copy, never a skipped update.
pub fn up_to_date(src: &Path, dest: &Path) -> bool {
    let (Ok(src_meta), Ok(dest_meta)) = (fs::metadata(src), fs::metadata(dest)) else {
        return false;
    };

    match (src_meta.modified(), dest_meta.modified()) {
        (Ok(src_mtime), Ok(dest_mtime)) => dest_mtime >= src_mtime,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_destination_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, "hello").unwrap();
        assert!(!up_to_date(&src, &tmp.path().join("missing.txt")));
    }

    #[test]
    fn freshly_copied_destination_is_up_to_date() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, "hello").unwrap();
        fs::copy(&src, &dest).unwrap();
        assert!(up_to_date(&src, &dest));
    }
}
