//! Mtime lookups used as the fast path of dependency checks.
//!
//! An unchanged mtime means the file is treated as unchanged; a changed
//! mtime falls back to comparing content hashes, so touching a file
//! without editing it never invalidates a bundle.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}
