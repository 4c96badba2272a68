//! Bundles: fluent asset collections rendered to markup.
//!
//! # Module Structure
//!
//! - `definition` - groups and options, frozen into every cache entry
//! - `group` - one group of assets with its attributes
//! - `debug` - one tag per source file
//! - `release` - concatenate, minify, hash and write one file per group
//!
//! # Rendering
//!
//! ```text
//! render(target) ─┐
//! as_named(..) ───┼─> render_in(context) ─> cache hit? ─> stored tag
//! as_cached(..) ──┘                             │ miss or ignore_cache_once
//!                                               v
//!                                  debug / release render ─> cache.set
//! ```
//!
//! The cache holds immutable [`CacheEntry`] values. A bundle retrieved
//! with [`Engine::get_named`] is rebuilt from the entry's definition and
//! ignores the cache once, so a forced mode takes effect.

mod debug;
mod definition;
mod group;
mod release;


use std::path::PathBuf;
use std::sync::Arc;

pub use definition::{BundleDefinition, DEFAULT_GROUP, DEFAULT_HASH_KEY, Preprocessor, RenderMode};
pub use group::GroupBundle;
pub use release::group_target;

use crate::asset::{Asset, BundleKind, Minifier};
use crate::cache::{CacheEntry, CacheScope, RenderContext, RenderResult};
use crate::engine::Engine;
use crate::error::{BundleError, Result};

/// A mutable bundle definition plus the state of its last render.
pub struct Bundle {
    engine: Engine,
    def: BundleDefinition,
    dependent_files: Vec<PathBuf>,
    tag: Option<String>,
    context: Option<RenderContext>,
    ignore_cache_once: bool,
}

impl Bundle {
    pub(crate) fn new(engine: Engine, kind: BundleKind) -> Self {
        let mut def = BundleDefinition::new(kind);
        def.hash_key_name = engine.hash_key().to_string();
        Self {
            engine,
            def,
            dependent_files: Vec::new(),
            tag: None,
            context: None,
            ignore_cache_once: false,
        }
    }

    /// Rebuild a bundle from a cache entry. The next render skips the cache.
    pub(crate) fn from_entry(engine: Engine, entry: &CacheEntry) -> Self {
        Self {
            engine,
            def: entry.definition.clone(),
            dependent_files: entry.result.dependent_files.clone(),
            tag: Some(entry.result.tag.clone()),
            context: Some(entry.context.clone()),
            ignore_cache_once: true,
        }
    }

    // ========================================================================
    // Assets
    // ========================================================================

    /// Add local files or directories to the default group.
    pub fn add<I>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.add_to_group(DEFAULT_GROUP, paths)
    }

    pub fn add_to_group<I>(&mut self, group: &str, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let group = self.def.group_mut(group);
        for path in paths {
            group.add(Asset::local(path));
        }
        self
    }

    /// `local_path` is used in debug mode, `remote_url` verbatim in release.
    pub fn add_remote(&mut self, local_path: &str, remote_url: &str) -> &mut Self {
        self.add_remote_to_group(DEFAULT_GROUP, local_path, remote_url)
    }

    pub fn add_remote_to_group(&mut self, group: &str, local_path: &str, remote_url: &str) -> &mut Self {
        self.def
            .group_mut(group)
            .add(Asset::remote(local_path, remote_url));
        self
    }

    /// `locator` names a resource registered with the embedded resolver.
    pub fn add_embedded_resource(&mut self, local_path: &str, locator: &str) -> &mut Self {
        self.add_embedded_resource_to_group(DEFAULT_GROUP, local_path, locator)
    }

    pub fn add_embedded_resource_to_group(
        &mut self,
        group: &str,
        local_path: &str,
        locator: &str,
    ) -> &mut Self {
        self.def
            .group_mut(group)
            .add(Asset::embedded(local_path, locator));
        self
    }

    /// Remove assets whose local or remote path matches.
    pub fn remove<I>(&mut self, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.remove_from_group(DEFAULT_GROUP, paths)
    }

    /// Unknown groups and paths are ignored.
    pub fn remove_from_group<I>(&mut self, group: &str, paths: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if let Some(group) = self.def.groups.get_mut(group) {
            for path in paths {
                group.remove(path.as_ref());
            }
        }
        self
    }

    // ========================================================================
    // Options
    // ========================================================================

    /// Reuse an existing output file instead of minifying again.
    pub fn render_only_if_output_file_missing(&mut self) -> &mut Self {
        self.def.render_only_if_missing = true;
        self
    }

    pub fn force_debug(&mut self) -> &mut Self {
        self.def.forced_mode = Some(RenderMode::Debug);
        self
    }

    pub fn force_release(&mut self) -> &mut Self {
        self.def.forced_mode = Some(RenderMode::Release);
        self
    }

    pub fn with_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.with_group_attribute(name, value, DEFAULT_GROUP)
    }

    pub fn with_attributes<I, K, V>(&mut self, attributes: I, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.with_group_attributes(attributes, DEFAULT_GROUP, merge)
    }

    pub fn with_group_attribute(&mut self, name: &str, value: &str, group: &str) -> &mut Self {
        self.def.group_mut(group).set_attribute(name, value);
        self
    }

    pub fn with_group_attributes<I, K, V>(&mut self, attributes: I, group: &str, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.def.group_mut(group).set_attributes(attributes, merge);
        self
    }

    /// Use a default-constructed `M` instead of the engine's minifier.
    pub fn with_minifier<M: Minifier + Default + 'static>(&mut self) -> &mut Self {
        self.with_minifier_instance(Arc::new(M::default()))
    }

    pub fn with_minifier_instance(&mut self, minifier: Arc<dyn Minifier>) -> &mut Self {
        self.def.minifier = Some(minifier);
        self
    }

    pub fn with_preprocessor(&mut self, preprocessor: Arc<dyn Preprocessor>) -> &mut Self {
        self.def.preprocessor = Some(preprocessor);
        self
    }

    /// Rename the cache-busting query parameter.
    pub fn hash_key_named(&mut self, name: &str) -> &mut Self {
        self.def.hash_key_name = name.to_string();
        self
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn kind(&self) -> BundleKind {
        self.def.kind
    }

    pub fn definition(&self) -> &BundleDefinition {
        &self.def
    }

    /// Mode the next render uses.
    pub fn mode(&self) -> RenderMode {
        self.def
            .forced_mode
            .unwrap_or_else(|| RenderMode::from_debug(self.engine.is_debugging_enabled()))
    }

    /// Markup of the last render.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Files read by the last render.
    pub fn dependent_files(&self) -> &[PathBuf] {
        &self.dependent_files
    }

    /// Target of the last render.
    pub fn target(&self) -> Option<&str> {
        self.context.as_ref().map(|ctx| ctx.target.as_str())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render to `target` and return the markup.
    ///
    /// `#` in the target is replaced by the content hash; otherwise the
    /// hash is appended as a query parameter.
    pub fn render(&mut self, target: &str) -> Result<String> {
        let key = format!("{}{}", target, self.def.fingerprint(self.mode()));
        self.render_in(RenderContext::file(target, key))
    }

    /// Render to `target` and remember the result under `name`.
    pub fn as_named(&mut self, name: &str, target: &str) -> Result<String> {
        self.render_in(RenderContext::named(name, target))
    }

    /// Markup last rendered under `name`.
    ///
    /// After [`Engine::get_named`], renders again under the same name and
    /// target first.
    pub fn render_named(&mut self, name: &str) -> Result<String> {
        if self.ignore_cache_once {
            let target = self.last_target(name)?;
            return self.as_named(name, &target);
        }
        self.named_tag(name)
    }

    /// Render without writing files; the minified content is kept in the
    /// engine's content store under `name`.
    pub fn as_cached(&mut self, name: &str, target: &str) -> Result<String> {
        self.render_in(RenderContext::cached(name, target))
    }

    /// Content last rendered with [`Bundle::as_cached`] under `name`.
    pub fn render_cached(&mut self, name: &str) -> Result<String> {
        if self.ignore_cache_once {
            let target = self.last_target(name)?;
            self.as_cached(name, &target)?;
        }
        let key = self.prefixed(name);
        // The lookup evicts and re-renders a stale entry before its content is read.
        if self.engine.cache(CacheScope::Named).get(&key).is_none() {
            return Err(BundleError::CachedNotFound(name.to_string()));
        }
        self.engine
            .content()
            .get(&key)
            .ok_or_else(|| BundleError::CachedNotFound(name.to_string()))
    }

    /// Markup of the entry stored under `name`.
    pub fn render_cached_asset_tag(&mut self, name: &str) -> Result<String> {
        self.named_tag(name)
    }

    /// Drop every named bundle and cached content of the engine.
    pub fn clear_cache(&self) {
        self.engine.clear_cache();
    }

    fn named_tag(&self, name: &str) -> Result<String> {
        let key = self.prefixed(name);
        self.engine
            .cache(CacheScope::Named)
            .get(&key)
            .map(|entry| entry.result.tag.clone())
            .ok_or_else(|| BundleError::NamedNotFound(name.to_string()))
    }

    fn last_target(&self, name: &str) -> Result<String> {
        self.context
            .as_ref()
            .map(|ctx| ctx.target.clone())
            .ok_or_else(|| BundleError::NamedNotFound(name.to_string()))
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.def.kind.cache_prefix(), key)
    }

    /// Render under `context`, answering from the cache when possible.
    pub(crate) fn render_in(&mut self, context: RenderContext) -> Result<String> {
        let cache = Arc::clone(self.engine.cache(context.scope));
        let key = self.prefixed(&context.key);

        if !self.ignore_cache_once
            && let Some(entry) = cache.get(&key)
        {
            crate::debug!("cache"; "hit {}", key);
            self.apply(&entry.result, context);
            return Ok(entry.result.tag.clone());
        }

        let result = match self.mode() {
            RenderMode::Debug => self.render_debug()?,
            RenderMode::Release => self.render_release(&context)?,
        };
        self.ignore_cache_once = false;

        let entry = Arc::new(CacheEntry {
            result: result.clone(),
            definition: self.def.clone(),
            context: context.clone(),
        });
        cache.set(&key, entry);
        crate::debug!("cache"; "stored {} ({})", key, result.mode.as_str());

        let tag = result.tag.clone();
        self.apply(&result, context);
        Ok(tag)
    }

    fn apply(&mut self, result: &RenderResult, context: RenderContext) {
        self.dependent_files = result.dependent_files.clone();
        self.tag = Some(result.tag.clone());
        self.context = Some(context);
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("definition", &self.def)
            .field("tag", &self.tag)
            .field("context", &self.context)
            .field("ignore_cache_once", &self.ignore_cache_once)
            .finish()
    }
}
