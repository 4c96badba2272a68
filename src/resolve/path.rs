//! Web root and application path mapping.

use std::path::{Path, PathBuf};

use crate::utils::path::join_url;

/// Prefix marking a path relative to the application root.
const APP_RELATIVE: &str = "~/";

/// Translates asset paths between the file system and emitted URLs.
///
/// `~/js/site.js` maps to `{web_root}/js/site.js` on disk and to
/// `{app_path}js/site.js` in markup. Other relative paths are taken
/// relative to the web root on disk and emitted unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    web_root: PathBuf,
    app_path: String,
}

impl PathMapper {
    pub fn new(web_root: impl Into<PathBuf>, app_path: impl Into<String>) -> Self {
        let mut app_path = app_path.into();
        if !app_path.ends_with('/') {
            app_path.push('/');
        }
        Self {
            web_root: web_root.into(),
            app_path,
        }
    }

    pub fn web_root(&self) -> &Path {
        &self.web_root
    }

    pub fn app_path(&self) -> &str {
        &self.app_path
    }

    /// File-system location of `path`.
    pub fn to_fs(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix(APP_RELATIVE) {
            return self.web_root.join(rest);
        }
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.web_root.join(path)
        }
    }

    /// URL emitted in markup for `path`.
    pub fn to_url(&self, path: &str) -> String {
        match path.strip_prefix(APP_RELATIVE) {
            Some(rest) => join_url(&self.app_path, rest),
            None => path.to_string(),
        }
    }
}

impl Default for PathMapper {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(cwd, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_relative_paths() {
        let paths = PathMapper::new("/srv/site", "/shop");
        assert_eq!(paths.app_path(), "/shop/");
        assert_eq!(paths.to_fs("~/js/a.js"), PathBuf::from("/srv/site/js/a.js"));
        assert_eq!(paths.to_url("~/js/a.js"), "/shop/js/a.js");
    }

    #[test]
    fn test_site_relative_paths() {
        let paths = PathMapper::new("/srv/site", "/");
        assert_eq!(paths.to_fs("/js/a.js"), PathBuf::from("/js/a.js"));
        assert_eq!(paths.to_fs("js/a.js"), PathBuf::from("/srv/site/js/a.js"));
        assert_eq!(paths.to_url("/js/a.js"), "/js/a.js");
        assert_eq!(paths.to_url("js/a.js"), "js/a.js");
    }
}
