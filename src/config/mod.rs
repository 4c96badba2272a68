//! Configuration management for `packtag.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section.rs  # [engine], [cache], [retry], [[bundle]]
//! ├── error.rs    # ConfigError, ConfigDiagnostics
//! ├── util.rs     # config file lookup
//! └── mod.rs      # PacktagConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section            | Purpose                                        |
//! |--------------------|------------------------------------------------|
//! | `[engine]`         | Debug mode, web root, app path, hash key       |
//! | `[cache]`          | Sliding expiration, file watching              |
//! | `[retry]`          | Attempts and backoff for file IO               |
//! | `[[bundle]]`       | One bundle: kind, target, assets, options      |
//! | `[[bundle.group]]` | Named groups of a bundle                       |

mod error;
mod section;
mod util;

pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use section::{
    BundleSection, CacheSection, EmbeddedAsset, EngineSection, GroupSection, MinifierChoice,
    RemoteAsset, RetrySection,
};
pub use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::asset::NullMinifier;
use crate::bundle::{Bundle, RenderMode};
use crate::engine::{Engine, EngineBuilder};
use crate::error::Result as BundleResult;
use crate::log;
use crate::resolve::{EmbeddedResolver, Resolver};

/// Default config file name.
pub const CONFIG_FILE: &str = "packtag.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing packtag.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacktagConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory containing the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub bundle: Vec<BundleSection>,
}

impl PacktagConfig {
    /// Find `config_name` upward from the current directory and load it.
    pub fn load(config_name: &Path) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|err| ConfigError::Io(config_name.to_path_buf(), err))?;
        let path = find_config_file(&cwd, config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;
        Self::from_path(&path)
    }

    /// Load configuration from file path with unknown field detection.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.config_path = path.to_path_buf();
        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate().map_err(ConfigError::Diagnostics)?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Check the whole config, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigDiagnostics> {
        let mut diag = ConfigDiagnostics::new();

        if self.retry.attempts == 0 {
            diag.error_with_hint(
                "retry.attempts",
                "must be at least 1",
                "use 1 to disable retries",
            );
        }
        if self.engine.hash_key.is_empty() {
            diag.error("engine.hash_key", "must not be empty");
        }

        let mut names = FxHashSet::default();
        for (i, bundle) in self.bundle.iter().enumerate() {
            let field = |name: &str| format!("bundle[{i}].{name}");

            if bundle.name.is_empty() {
                diag.error(field("name"), "must not be empty");
            } else if !names.insert((bundle.kind, bundle.name.as_str())) {
                diag.error(
                    field("name"),
                    format!("duplicate {} bundle `{}`", bundle.kind.cache_prefix(), bundle.name),
                );
            }
            if bundle.target.is_empty() {
                diag.error(field("target"), "must not be empty");
            }
            if bundle.target.matches('#').count() > 1 {
                diag.error_with_hint(
                    field("target"),
                    "more than one `#` placeholder",
                    "`#` marks where the content hash goes",
                );
            }
            if bundle.is_empty() {
                diag.error(field("assets"), "bundle has no assets");
            }
            if bundle.hash_key.as_deref() == Some("") {
                diag.error(field("hash_key"), "must not be empty");
            }
            for (j, group) in bundle.group.iter().enumerate() {
                if group.name.is_empty() {
                    diag.error(field(&format!("group[{j}].name")), "must not be empty");
                }
            }
            for embedded in bundle.embedded_assets() {
                let source = self.root.join(&embedded.source);
                if !source.is_file() {
                    diag.error(
                        field("embedded"),
                        format!("source `{}` not found", embedded.source.display()),
                    );
                }
            }
        }

        diag.into_result()
    }

    /// Absolute web root.
    pub fn web_root(&self) -> PathBuf {
        self.root.join(&self.engine.web_root)
    }

    /// Engine builder with every configured option applied.
    ///
    /// `debug` overrides `engine.debug`. The embedded resolver is returned
    /// so callers can register further resources.
    pub fn engine_builder(&self, debug: Option<bool>) -> BundleResult<(EngineBuilder, Arc<EmbeddedResolver>)> {
        let web_root = self.web_root();
        let embedded = Arc::new(
            EmbeddedResolver::new(web_root.join(&self.engine.extract_dir))
                .with_retry(self.retry.policy()),
        );
        for bundle in &self.bundle {
            for asset in bundle.embedded_assets() {
                embedded.register_file(asset.resource.clone(), &self.root.join(&asset.source))?;
            }
        }

        let builder = Engine::builder()
            .debug(debug.unwrap_or(self.engine.debug))
            .web_root(web_root)
            .app_path(self.engine.app_path.clone())
            .embedded(Arc::clone(&embedded) as Arc<dyn Resolver>)
            .hash_key(self.engine.hash_key.clone())
            .ttl(self.cache.ttl())
            .watch(self.cache.watch)
            .retry(self.retry.policy());
        Ok((builder, embedded))
    }
}

impl BundleSection {
    /// Create the configured bundle on `engine`.
    pub fn build(&self, engine: &Engine) -> Bundle {
        let mut bundle = engine.bundle(self.kind);
        for group in self.groups() {
            let name = group.name.as_str();
            bundle.add_to_group(name, group.assets.iter().cloned());
            for remote in &group.remote {
                bundle.add_remote_to_group(name, &remote.local, &remote.url);
            }
            for embedded in &group.embedded {
                bundle.add_embedded_resource_to_group(name, &embedded.local, &embedded.resource);
            }
            if !group.attributes.is_empty() {
                bundle.with_group_attributes(group.attributes.clone(), name, true);
            }
        }

        if self.minifier == MinifierChoice::Null {
            bundle.with_minifier::<NullMinifier>();
        }
        if let Some(hash_key) = &self.hash_key {
            bundle.hash_key_named(hash_key);
        }
        if self.only_if_missing {
            bundle.render_only_if_output_file_missing();
        }
        match self.mode {
            Some(RenderMode::Debug) => {
                bundle.force_debug();
            }
            Some(RenderMode::Release) => {
                bundle.force_release();
            }
            None => {}
        }
        bundle
    }
}
