//! Bounded retries for file IO.
//!
//! Output files may be briefly locked by a web server or an editor while
//! they are read or replaced. Transient errors are retried a fixed number
//! of times with a fixed backoff; anything else fails immediately.

use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::{BundleError, Result};

/// Retry policy for file reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts (at least one is always made).
    pub attempts: u32,
    /// Delay between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// Single attempt, no delay.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Run `op`, retrying transient failures.
    pub fn run<T>(&self, path: &Path, mut op: impl FnMut() -> io::Result<T>) -> Result<T> {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && is_transient(&err) => {
                    crate::debug!("io"; "retry {}/{} on {}: {}", attempt, attempts, path.display(), err);
                    thread::sleep(self.backoff);
                    attempt += 1;
                }
                Err(source) => {
                    return Err(BundleError::Io {
                        path: path.to_path_buf(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    /// Read a UTF-8 file.
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        self.run(path, || fs::read_to_string(path))
    }

    /// Write `content` to `path`, creating parent directories.
    ///
    /// Skips the write when the file already holds exactly `content`.
    /// Returns `true` if the file was written.
    pub fn write(&self, path: &Path, content: &str) -> Result<bool> {
        if file_content_matches(path, content) {
            crate::debug!("io"; "unchanged, skipping write: {}", path.display());
            return Ok(false);
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            self.run(parent, || fs::create_dir_all(parent))?;
        }
        self.run(path, || fs::write(path, content))?;
        Ok(true)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(10))
    }
}

/// Errors worth another attempt: locks and interrupted syscalls.
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::PermissionDenied
            | io::ErrorKind::ResourceBusy
    )
}

/// Check if file content is the same as new content
fn file_content_matches(path: &Path, content: &str) -> bool {
    path.exists() && fs::read_to_string(path).is_ok_and(|existing| existing == content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn quick(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::ZERO)
    }

    #[test]
    fn test_retries_transient_until_success() {
        let calls = Cell::new(0);
        let value = quick(3)
            .run(Path::new("locked.js"), || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(io::Error::new(io::ErrorKind::WouldBlock, "busy"))
                } else {
                    Ok(42)
                }
            })
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhausted_retries_surface_attempts() {
        let err = quick(4)
            .run(Path::new("locked.js"), || -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            })
            .unwrap_err();
        match err {
            BundleError::Io { attempts, .. } => assert_eq!(attempts, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_found_fails_immediately() {
        let calls = Cell::new(0);
        let err = quick(5)
            .run(Path::new("missing.js"), || -> io::Result<()> {
                calls.set(calls.get() + 1);
                Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
            })
            .unwrap_err();
        assert!(matches!(err, BundleError::Io { attempts: 1, .. }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_write_creates_parents_and_skips_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/js/site.js");
        let policy = RetryPolicy::default();

        assert!(policy.write(&path, "a();").unwrap());
        assert!(!policy.write(&path, "a();").unwrap());
        assert!(policy.write(&path, "b();").unwrap());
        assert_eq!(policy.read_to_string(&path).unwrap(), "b();");
    }
}
