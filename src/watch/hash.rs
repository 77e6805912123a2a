// src/watch/hash.rs

//! Content hashing for watch-trigger deduplication.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

/// Compute the hash of a single file.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute an aggregate hash from a list of file hashes.
///
/// `hashes` must be sorted by the corresponding file path to ensure
/// stability.
pub fn compute_aggregate_hash(hashes: &[String]) -> String {
    let mut hasher = Hasher::new();
    for h in hashes {
        hasher.update(h.as_bytes());
    }
    let hash = hasher.finalize().to_hex().to_string();
    debug!(hash = %hash, "computed aggregate hash");
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_hash_is_order_sensitive_and_stable() {
        let a = "aaaa".to_string();
        let b = "bbbb".to_string();
        let one = compute_aggregate_hash(&[a.clone(), b.clone()]);
        let two = compute_aggregate_hash(&[a.clone(), b.clone()]);
        let swapped = compute_aggregate_hash(&[b, a]);
        assert_eq!(one, two);
        assert_ne!(one, swapped);
    }

    #[test]
    fn file_hash_changes_with_content() -> anyhow::Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("a.css");
        std::fs::write(&path, "body{}")?;
        let before = compute_file_hash(&path)?;
        std::fs::write(&path, "body{color:red}")?;
        let after = compute_file_hash(&path)?;
        assert_ne!(before, after);
        Ok(())
    }
}
