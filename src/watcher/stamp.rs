//! Change detection for a single watched file.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Files up to this size are fingerprinted by content as well, so rewrites
/// landing within one filesystem timestamp tick are still detected.
pub const DIGEST_LIMIT_BYTES: u64 = 64 * 1024;

/// Observable state of a watched file. Two different stamps mean the file
/// was created, removed, or rewritten between the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStamp {
    Missing,
    Present {
        modified: Option<SystemTime>,
        len: u64,
        digest: Option<u64>,
    },
}

/// Stat `path`. A missing file is a valid state, not an error; any other
/// failure is returned so the caller can retry on the next tick.
pub fn probe(path: &Path) -> io::Result<FileStamp> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileStamp::Missing),
        Err(e) => return Err(e),
    };

    let digest = if meta.is_file() && meta.len() <= DIGEST_LIMIT_BYTES {
        match std::fs::read(path) {
            Ok(bytes) => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Some(hasher.finish())
            }
            // Removed between stat and read
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileStamp::Missing),
            Err(e) => return Err(e),
        }
    } else {
        None
    };

    Ok(FileStamp::Present {
        modified: meta.modified().ok(),
        len: meta.len(),
        digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let stamp = probe(&tmp.path().join("nope")).unwrap();
        assert_eq!(stamp, FileStamp::Missing);
    }

    #[test]
    fn test_present_file_reports_length() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        match probe(&path).unwrap() {
            FileStamp::Present { len, digest, .. } => {
                assert_eq!(len, 5);
                assert!(digest.is_some());
            }
            other => panic!("Expected Present, got {other:?}"),
        }
    }

    #[test]
    fn test_same_length_rewrite_changes_stamp() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "1000").unwrap();
        let before = probe(&path).unwrap();

        std::fs::write(&path, "2000").unwrap();
        assert_ne!(probe(&path).unwrap(), before);
    }

    #[test]
    fn test_unchanged_file_keeps_stamp() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "steady").unwrap();

        assert_eq!(probe(&path).unwrap(), probe(&path).unwrap());
    }
}
