//! Directory expansion.

use std::path::PathBuf;

use jwalk::WalkDir;

use super::{PathMapper, Resolver};
use crate::error::{BundleError, Result};
use crate::utils::path::normalize_path;

/// Resolves a directory to every file below it, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct DirectoryResolver {
    paths: PathMapper,
}

impl DirectoryResolver {
    pub fn new(paths: PathMapper) -> Self {
        Self { paths }
    }
}

impl Resolver for DirectoryResolver {
    fn resolve(&self, locator: &str) -> Result<Vec<PathBuf>> {
        let root = self.paths.to_fs(locator);
        if !root.is_dir() {
            return Err(BundleError::resolve(
                locator,
                format!("directory not found: {}", root.display()),
            ));
        }
        let root = normalize_path(&root);
        let mut files: Vec<PathBuf> = WalkDir::new(&root)
            .sort(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.path())
            .collect();
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_files_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("lib/sub")).unwrap();
        fs::write(dir.path().join("lib/b.js"), "").unwrap();
        fs::write(dir.path().join("lib/a.js"), "").unwrap();
        fs::write(dir.path().join("lib/sub/c.js"), "").unwrap();

        let resolver = DirectoryResolver::new(PathMapper::new(dir.path(), "/"));
        let files = resolver.resolve("~/lib").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.js", "b.js", "c.js"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let resolver = DirectoryResolver::new(PathMapper::new(dir.path(), "/"));
        assert!(matches!(
            resolver.resolve("~/nope"),
            Err(BundleError::Resolve { .. })
        ));
    }
}
