//! Embedded resources.
//!
//! The host registers resource bytes under a locator (for example
//! `app://js/widget.js`). Resolving a locator extracts the resource to a
//! file below the extraction directory, so it can be read, minified and
//! tracked like any other source file.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::Resolver;
use crate::error::{BundleError, Result};
use crate::utils::path::url_to_safe_filename;
use crate::utils::retry::RetryPolicy;

/// Registry of embedded resources with on-demand extraction.
#[derive(Debug)]
pub struct EmbeddedResolver {
    resources: DashMap<String, String>,
    extract_dir: PathBuf,
    retry: RetryPolicy,
}

impl EmbeddedResolver {
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources: DashMap::new(),
            extract_dir: extract_dir.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    /// Register `content` under `locator`, replacing any previous resource.
    pub fn register(&self, locator: impl Into<String>, content: impl Into<String>) {
        self.resources.insert(locator.into(), content.into());
    }

    /// Register the content of `source` under `locator`.
    pub fn register_file(&self, locator: impl Into<String>, source: &Path) -> Result<()> {
        let content = self.retry.read_to_string(source)?;
        self.register(locator, content);
        Ok(())
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.resources.contains_key(locator)
    }

    /// Where `locator` is extracted to.
    pub fn extracted_path(&self, locator: &str) -> PathBuf {
        self.extract_dir.join(url_to_safe_filename(locator))
    }
}

impl Resolver for EmbeddedResolver {
    fn resolve(&self, locator: &str) -> Result<Vec<PathBuf>> {
        let content = self
            .resources
            .get(locator)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BundleError::resolve(locator, "no embedded resource registered"))?;

        let path = self.extracted_path(locator);
        if self.retry.write(&path, &content)? {
            crate::debug!("resolve"; "extracted {} -> {}", locator, path.display());
        }
        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extracts_registered_resource() {
        let dir = TempDir::new().unwrap();
        let resolver = EmbeddedResolver::new(dir.path());
        resolver.register("app://js/widget.js", "widget()");

        let paths = resolver.resolve("app://js/widget.js").unwrap();
        assert_eq!(paths, vec![resolver.extracted_path("app://js/widget.js")]);
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "widget()");
    }

    #[test]
    fn test_unknown_resource() {
        let dir = TempDir::new().unwrap();
        let resolver = EmbeddedResolver::new(dir.path());
        assert!(!resolver.contains("app://missing.js"));
        assert!(matches!(
            resolver.resolve("app://missing.js"),
            Err(BundleError::Resolve { .. })
        ));
    }

    #[test]
    fn test_register_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.js");
        std::fs::write(&source, "fromFile()").unwrap();

        let resolver = EmbeddedResolver::new(dir.path().join("extract"));
        resolver.register_file("app://a.js", &source).unwrap();
        let paths = resolver.resolve("app://a.js").unwrap();
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "fromFile()");
    }
}
