//! The bundling engine: shared collaborators and caches for every bundle.
//!
//! An [`Engine`] is cheap to clone. Bundles created from it share its
//! caches, content store, resolvers and hasher.
//!
//! ```ignore
//! let engine = Engine::builder().web_root("site").debug(false).build()?;
//! let tag = engine
//!     .javascript()
//!     .add(["~/js/jquery.js", "~/js/site.js"])
//!     .render("~/js/combined_#.js")?;
//! ```

mod builder;
mod status;

use std::sync::{Arc, Weak};

pub use builder::EngineBuilder;
pub use status::{DebugStatus, EnvDebugStatus, FixedDebugStatus};

use crate::asset::{BundleKind, Minifier};
use crate::bundle::Bundle;
use crate::cache::{BundleCache, CacheScope, Eviction};
use crate::error::{BundleError, Result};
use crate::freshness::Hasher;
use crate::render::ContentStore;
use crate::resolve::{PathMapper, Resolvers};
use crate::utils::retry::RetryPolicy;

pub(crate) struct EngineInner {
    debug: Arc<dyn DebugStatus>,
    resolvers: Resolvers,
    hasher: Arc<dyn Hasher>,
    cache: Arc<dyn BundleCache>,
    named: Arc<dyn BundleCache>,
    content: ContentStore,
    retry: RetryPolicy,
    js_minifier: Arc<dyn Minifier>,
    css_minifier: Arc<dyn Minifier>,
    hash_key: String,
}

/// Handle to a configured engine.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// An empty JavaScript bundle.
    pub fn javascript(&self) -> Bundle {
        self.bundle(BundleKind::JavaScript)
    }

    /// An empty stylesheet bundle.
    pub fn css(&self) -> Bundle {
        self.bundle(BundleKind::Stylesheet)
    }

    pub fn bundle(&self, kind: BundleKind) -> Bundle {
        Bundle::new(self.clone(), kind)
    }

    /// Rebuild the bundle last rendered under `name`.
    ///
    /// The returned bundle ignores the cache on its next render, so its
    /// mode can be switched before calling [`Bundle::render_named`].
    pub fn get_named(&self, kind: BundleKind, name: &str) -> Result<Bundle> {
        let key = format!("{}{}", kind.cache_prefix(), name);
        let entry = self
            .inner
            .named
            .get(&key)
            .ok_or_else(|| BundleError::NamedNotFound(name.to_string()))?;
        Ok(Bundle::from_entry(self.clone(), &entry))
    }

    /// Drop every named bundle and cached content. Nothing is re-rendered.
    pub fn clear_cache(&self) {
        self.inner.named.clear();
        self.inner.content.clear();
    }

    /// The engine-wide mode, ignoring per-bundle overrides.
    pub fn is_debugging_enabled(&self) -> bool {
        self.inner.debug.is_debugging_enabled()
    }

    pub fn paths(&self) -> &PathMapper {
        &self.inner.resolvers.paths
    }

    pub fn resolvers(&self) -> &Resolvers {
        &self.inner.resolvers
    }

    pub fn hasher(&self) -> &dyn Hasher {
        self.inner.hasher.as_ref()
    }

    pub fn cache(&self, scope: CacheScope) -> &Arc<dyn BundleCache> {
        match scope {
            CacheScope::Default => &self.inner.cache,
            CacheScope::Named => &self.inner.named,
        }
    }

    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    pub fn retry(&self) -> RetryPolicy {
        self.inner.retry
    }

    pub fn hash_key(&self) -> &str {
        &self.inner.hash_key
    }

    /// Minifier used by bundles of `kind` that set none.
    pub fn default_minifier(&self, kind: BundleKind) -> Arc<dyn Minifier> {
        match kind {
            BundleKind::JavaScript => Arc::clone(&self.inner.js_minifier),
            BundleKind::Stylesheet => Arc::clone(&self.inner.css_minifier),
        }
    }

    fn downgrade(&self) -> Weak<EngineInner> {
        Arc::downgrade(&self.inner)
    }

    /// Render an evicted entry again from its frozen definition.
    fn rerender(&self, eviction: &Eviction) {
        if !eviction.reason.should_rerender() {
            return;
        }
        let context = eviction.entry.context.clone();
        let mut bundle = Bundle::from_entry(self.clone(), &eviction.entry);
        match bundle.render_in(context) {
            Ok(_) => crate::debug!("cache"; "re-rendered {} ({:?})", eviction.key, eviction.reason),
            Err(e) => crate::log!("cache"; "re-render of {} failed: {}", eviction.key, e),
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("debug", &self.is_debugging_enabled())
            .field("paths", self.paths())
            .field("hash_key", &self.inner.hash_key)
            .field("cached", &self.inner.cache.len())
            .field("named", &self.inner.named.len())
            .finish()
    }
}
