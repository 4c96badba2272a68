//! Per-file stamps recorded when a render is cached.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::hash::{ContentHash, compute_file_hash};
use super::mtime::get_mtime;

/// Snapshot of one dependent file at cache time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    path: PathBuf,
    mtime: Option<SystemTime>,
    hash: ContentHash,
}

impl FileStamp {
    /// Stamp `path` as it is on disk now.
    pub fn capture(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            mtime: get_mtime(path),
            hash: compute_file_hash(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether the file still matches this stamp.
    ///
    /// Same mtime is trusted; a different mtime is confirmed by hashing.
    /// A file that disappeared is never current.
    pub fn is_current(&self) -> bool {
        let Some(mtime) = get_mtime(&self.path) else {
            return false;
        };
        if self.mtime == Some(mtime) {
            return true;
        }
        let hash = compute_file_hash(&self.path);
        !hash.is_empty() && hash == self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_stamp_current_until_content_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "a()").unwrap();

        let stamp = FileStamp::capture(&path);
        assert!(stamp.is_current());

        // Rewriting identical content keeps the stamp current even if mtime moves.
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&path, "a()").unwrap();
        assert!(stamp.is_current());

        std::thread::sleep(Duration::from_millis(20));
        fs::write(&path, "b()").unwrap();
        assert!(!stamp.is_current());
    }

    #[test]
    fn test_stamp_of_removed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "a()").unwrap();

        let stamp = FileStamp::capture(&path);
        fs::remove_file(&path).unwrap();
        assert!(!stamp.is_current());
    }
}
