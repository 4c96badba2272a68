//! Asset and bundle kind definitions.

use serde::{Deserialize, Serialize};

/// How an asset is located at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Plain file (or directory) under the web root.
    Local,
    /// Remote URL with a local fallback used in debug mode.
    Remote,
    /// Embedded resource extracted to disk before use.
    Embedded,
}

/// Kind of front-end resource a bundle produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BundleKind {
    #[serde(rename = "js")]
    JavaScript,
    #[serde(rename = "css")]
    Stylesheet,
}

impl BundleKind {
    /// Cache key namespace, so equal names never collide across kinds.
    pub const fn cache_prefix(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::Stylesheet => "css",
        }
    }

    /// File extension picked up when a directory is added.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::Stylesheet => "css",
        }
    }
}
