//! The asset value type.

use super::kind::AssetKind;

/// One input of a bundle.
///
/// Two assets are the same asset when all fields match; removal only
/// looks at the local and remote paths (see [`Asset::matches`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub local_path: String,
    pub remote_path: Option<String>,
    pub is_embedded_resource: bool,
    pub order: i32,
}

impl Asset {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            local_path: path.into(),
            remote_path: None,
            is_embedded_resource: false,
            order: 0,
        }
    }

    pub fn remote(local_path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: Some(url.into()),
            is_embedded_resource: false,
            order: 0,
        }
    }

    /// `locator` is handed to the embedded-resource resolver.
    pub fn embedded(local_path: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: Some(locator.into()),
            is_embedded_resource: true,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn kind(&self) -> AssetKind {
        match (&self.remote_path, self.is_embedded_resource) {
            (None, _) => AssetKind::Local,
            (Some(_), false) => AssetKind::Remote,
            (Some(_), true) => AssetKind::Embedded,
        }
    }

    /// True if `path` names this asset by its local or remote path.
    pub fn matches(&self, path: &str) -> bool {
        self.local_path == path || self.remote_path.as_deref() == Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind() {
        assert_eq!(Asset::local("a.js").kind(), AssetKind::Local);
        assert_eq!(
            Asset::remote("jquery.js", "https://cdn.example.com/jquery.min.js").kind(),
            AssetKind::Remote
        );
        assert_eq!(
            Asset::embedded("js/embedded.js", "app://js.embedded.js").kind(),
            AssetKind::Embedded
        );
    }

    #[test]
    fn test_matches_local_or_remote() {
        let asset = Asset::remote("jquery.js", "https://cdn.example.com/jquery.min.js");
        assert!(asset.matches("jquery.js"));
        assert!(asset.matches("https://cdn.example.com/jquery.min.js"));
        assert!(!asset.matches("other.js"));
    }

    #[test]
    fn test_equality_includes_order() {
        assert_eq!(Asset::local("a.js"), Asset::local("a.js"));
        assert_ne!(Asset::local("a.js"), Asset::local("a.js").with_order(1));
    }
}
