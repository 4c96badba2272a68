//! Output of rendered bundles: where minified content goes, and the
//! markup that references it.

mod store;
mod tag;

use std::path::{Path, PathBuf};

pub use store::ContentStore;
pub use tag::{TagTemplate, render_attributes};

use crate::error::Result;
use crate::utils::retry::RetryPolicy;

/// Destination of one release-mode payload.
pub trait Renderer {
    /// Persist `content`. Returns `true` if anything changed.
    fn render(&self, content: &str) -> Result<bool>;

    /// Previously rendered content, if any.
    fn existing(&self) -> Result<Option<String>>;
}

/// Writes the payload to a file.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
    retry: RetryPolicy,
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Renderer for FileRenderer {
    fn render(&self, content: &str) -> Result<bool> {
        let written = self.retry.write(&self.path, content)?;
        if written {
            crate::debug!("render"; "wrote {}", self.path.display());
        }
        Ok(written)
    }

    fn existing(&self) -> Result<Option<String>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        self.retry.read_to_string(&self.path).map(Some)
    }
}

/// Keeps the payload in a [`ContentStore`] instead of on disk.
#[derive(Debug, Clone)]
pub struct CacheRenderer {
    store: ContentStore,
    key: String,
}

impl CacheRenderer {
    pub fn new(store: ContentStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

impl Renderer for CacheRenderer {
    fn render(&self, content: &str) -> Result<bool> {
        Ok(self.store.put(&self.key, content))
    }

    fn existing(&self) -> Result<Option<String>> {
        Ok(self.store.get(&self.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_renderer() {
        let dir = TempDir::new().unwrap();
        let renderer = FileRenderer::new(dir.path().join("out/site.js"), RetryPolicy::none());

        assert_eq!(renderer.existing().unwrap(), None);
        assert!(renderer.render("a();").unwrap());
        assert!(!renderer.render("a();").unwrap());
        assert_eq!(renderer.existing().unwrap().as_deref(), Some("a();"));
    }

    #[test]
    fn test_cache_renderer_writes_nothing_to_disk() {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::new();
        let renderer = CacheRenderer::new(store.clone(), "jssite");

        assert_eq!(renderer.existing().unwrap(), None);
        assert!(renderer.render("a();").unwrap());
        assert_eq!(store.get("jssite").as_deref(), Some("a();"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
