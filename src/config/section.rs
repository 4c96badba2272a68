//! Configuration sections of `packtag.toml`.
//!
//! # Example
//!
//! ```toml
//! [engine]
//! debug = false               # Render every bundle in debug mode
//! web_root = "public"         # Directory `~/` maps to
//! app_path = "/"              # URL prefix `~/` expands to
//! hash_key = "r"              # Cache-busting query parameter
//!
//! [cache]
//! ttl_secs = 0                # Sliding expiration (0 = never)
//! watch = true                # Re-render when a source file changes
//!
//! [[bundle]]
//! name = "site"
//! kind = "js"
//! target = "~/js/site_#.js"
//! assets = ["~/js/jquery.js", "~/js/app"]
//! remote = [{ local = "~/js/analytics.js", url = "https://cdn.example.com/a.js" }]
//! attributes = { defer = "defer" }
//!
//! [[bundle.group]]
//! name = "head"
//! assets = ["~/js/modernizr.js"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::asset::BundleKind;
use crate::bundle::{DEFAULT_GROUP, DEFAULT_HASH_KEY, RenderMode};
use crate::utils::retry::RetryPolicy;

/// `[engine]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Render every bundle without a `mode` in debug mode.
    pub debug: bool,

    /// Directory `~/` and relative paths resolve against.
    /// Relative to the config file.
    pub web_root: PathBuf,

    /// URL prefix `~/` expands to in markup.
    pub app_path: String,

    /// Default cache-busting query parameter.
    pub hash_key: String,

    /// Where embedded resources are extracted. Relative to the web root.
    pub extract_dir: PathBuf,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            debug: false,
            web_root: PathBuf::from("."),
            app_path: "/".to_string(),
            hash_key: DEFAULT_HASH_KEY.to_string(),
            extract_dir: PathBuf::from(".packtag/embedded"),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Sliding expiration in seconds. 0 disables expiry.
    pub ttl_secs: u64,

    /// Watch dependent files and re-render on change.
    pub watch: bool,
}

impl CacheSection {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.attempts,
            backoff_ms: u64::try_from(policy.backoff.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.backoff_ms))
    }
}

/// Minifier choice for one bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifierChoice {
    /// The engine's minifier for the bundle kind.
    #[default]
    Default,
    /// No minification.
    Null,
}

/// `{ local, url }` entry of `remote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub local: String,
    pub url: String,
}

/// `{ local, resource, source }` entry of `embedded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedAsset {
    /// Path the resource is copied to in debug mode.
    pub local: String,
    /// Locator the resource is registered under.
    pub resource: String,
    /// File holding the resource content. Relative to the config file.
    pub source: PathBuf,
}

/// `[[bundle.group]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSection {
    pub name: String,
    pub assets: Vec<String>,
    pub remote: Vec<RemoteAsset>,
    pub embedded: Vec<EmbeddedAsset>,
    pub attributes: IndexMap<String, String>,
}

impl GroupSection {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.remote.is_empty() && self.embedded.is_empty()
    }
}

/// `[[bundle]]` entry. Its own assets go to the default group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSection {
    /// Name the bundle is rendered under.
    pub name: String,

    pub kind: BundleKind,

    /// Output path; `#` is replaced by the content hash.
    pub target: String,

    #[serde(default)]
    pub assets: Vec<String>,

    #[serde(default)]
    pub remote: Vec<RemoteAsset>,

    #[serde(default)]
    pub embedded: Vec<EmbeddedAsset>,

    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    #[serde(default)]
    pub minifier: MinifierChoice,

    /// Overrides `engine.hash_key`.
    #[serde(default)]
    pub hash_key: Option<String>,

    /// Reuse an existing output file instead of minifying again.
    #[serde(default)]
    pub only_if_missing: bool,

    /// Overrides `engine.debug` for this bundle.
    #[serde(default)]
    pub mode: Option<RenderMode>,

    #[serde(default)]
    pub group: Vec<GroupSection>,
}

impl BundleSection {
    /// Default group followed by the named groups.
    pub fn groups(&self) -> Vec<GroupSection> {
        let default = GroupSection {
            name: DEFAULT_GROUP.to_string(),
            assets: self.assets.clone(),
            remote: self.remote.clone(),
            embedded: self.embedded.clone(),
            attributes: self.attributes.clone(),
        };
        std::iter::once(default)
            .chain(self.group.iter().cloned())
            .collect()
    }

    /// Every embedded asset, across groups.
    pub fn embedded_assets(&self) -> impl Iterator<Item = &EmbeddedAsset> {
        self.embedded
            .iter()
            .chain(self.group.iter().flat_map(|g| g.embedded.iter()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups().iter().all(GroupSection::is_empty)
    }
}
