//! Plain file resolution.

use std::path::PathBuf;

use super::{PathMapper, Resolver};
use crate::error::{BundleError, Result};
use crate::utils::path::normalize_path;

/// Resolves a locator to exactly one existing file.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    paths: PathMapper,
}

impl FileResolver {
    pub fn new(paths: PathMapper) -> Self {
        Self { paths }
    }
}

impl Resolver for FileResolver {
    fn resolve(&self, locator: &str) -> Result<Vec<PathBuf>> {
        let path = self.paths.to_fs(locator);
        if !path.is_file() {
            return Err(BundleError::resolve(
                locator,
                format!("file not found: {}", path.display()),
            ));
        }
        Ok(vec![normalize_path(&path)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_existing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.js"), "a()").unwrap();

        let resolver = FileResolver::new(PathMapper::new(dir.path(), "/"));
        let paths = resolver.resolve("~/a.js").unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("a.js"));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let resolver = FileResolver::new(PathMapper::new(dir.path(), "/"));
        assert!(resolver.resolve("~/").is_err());
    }
}
