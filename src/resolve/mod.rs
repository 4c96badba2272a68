//! Mapping asset locators to files on disk.
//!
//! # Module Structure
//!
//! - `path` - web root / application path mapping (`~/` expansion)
//! - `file` - one locator, one file
//! - `dir` - one locator, every matching file below a directory
//! - `embedded` - resources compiled into the host, extracted on demand
//!
//! Remote assets are never resolved: their URL is emitted verbatim and
//! they never become cache dependencies.

mod dir;
mod embedded;
mod file;
mod path;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use dir::DirectoryResolver;
pub use embedded::EmbeddedResolver;
pub use file::FileResolver;
pub use path::PathMapper;

use crate::error::{BundleError, Result};
use crate::utils::path::{join_url, normalize_path};

/// Maps a locator to absolute file-system paths.
pub trait Resolver: Send + Sync {
    fn resolve(&self, locator: &str) -> Result<Vec<PathBuf>>;
}

/// A source file found for an asset, with the URL debug tags point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub url: String,
}

/// The resolvers an engine renders with.
#[derive(Clone)]
pub struct Resolvers {
    pub paths: PathMapper,
    pub file: Arc<dyn Resolver>,
    pub directory: Arc<dyn Resolver>,
    pub embedded: Arc<dyn Resolver>,
}

impl Resolvers {
    /// Default file and directory resolvers over `paths`.
    pub fn new(paths: PathMapper, embedded: Arc<dyn Resolver>) -> Self {
        Self {
            file: Arc::new(FileResolver::new(paths.clone())),
            directory: Arc::new(DirectoryResolver::new(paths.clone())),
            paths,
            embedded,
        }
    }

    /// Resolve a local path: a file yields itself, a directory yields
    /// every file with `extension` below it, sorted.
    pub fn resolve_local(&self, local_path: &str, extension: &str) -> Result<Vec<ResolvedFile>> {
        let url = self.paths.to_url(local_path);
        if !self.paths.to_fs(local_path).is_dir() {
            let path = single(local_path, self.file.resolve(local_path)?)?;
            return Ok(vec![ResolvedFile { path, url }]);
        }

        let root = normalize_path(&self.paths.to_fs(local_path));
        let files = self
            .directory
            .resolve(local_path)?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == extension))
            .map(|path| {
                let relative = relative_url(&path, &root);
                ResolvedFile {
                    url: join_url(&url, &relative),
                    path,
                }
            })
            .collect();
        Ok(files)
    }

    /// Resolve an embedded resource to its extracted file.
    pub fn resolve_embedded(&self, locator: &str) -> Result<PathBuf> {
        let path = single(locator, self.embedded.resolve(locator)?)?;
        Ok(normalize_path(&path))
    }
}

/// The last path a resolver yielded; none at all is a resolution failure.
fn single(locator: &str, paths: Vec<PathBuf>) -> Result<PathBuf> {
    paths
        .into_iter()
        .last()
        .ok_or_else(|| BundleError::resolve(locator, "resolver returned no path"))
}

/// `path` relative to `root`, with forward slashes.
fn relative_url(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolvers(root: &Path) -> Resolvers {
        let paths = PathMapper::new(root, "/");
        let embedded = Arc::new(EmbeddedResolver::new(root.join(".embedded")));
        Resolvers::new(paths, embedded)
    }

    #[test]
    fn test_resolve_local_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/a.js"), "a()").unwrap();

        let files = resolvers(dir.path()).resolve_local("~/js/a.js", "js").unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].url, "/js/a.js");
        assert!(files[0].path.is_absolute());
        assert!(files[0].path.ends_with("js/a.js"));
    }

    #[test]
    fn test_resolve_local_directory_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let lib = dir.path().join("js/lib");
        fs::create_dir_all(lib.join("nested")).unwrap();
        fs::write(lib.join("b.js"), "b()").unwrap();
        fs::write(lib.join("a.js"), "a()").unwrap();
        fs::write(lib.join("nested/c.js"), "c()").unwrap();
        fs::write(lib.join("readme.md"), "# lib").unwrap();

        let files = resolvers(dir.path()).resolve_local("~/js/lib", "js").unwrap();
        let urls: Vec<_> = files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, ["/js/lib/a.js", "/js/lib/b.js", "/js/lib/nested/c.js"]);
    }

    #[test]
    fn test_resolve_local_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = resolvers(dir.path())
            .resolve_local("~/js/missing.js", "js")
            .unwrap_err();
        assert!(matches!(err, BundleError::Resolve { .. }));
    }
}
