//! Engine construction.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{DebugStatus, Engine, EngineInner, FixedDebugStatus};
use crate::asset::{CssMinifier, JsMinifier, Minifier};
use crate::bundle::DEFAULT_HASH_KEY;
use crate::cache::{ApplicationCache, BundleCache, Eviction, EvictionHook};
use crate::error::Result;
use crate::freshness::{Blake3Hasher, Hasher};
use crate::render::ContentStore;
use crate::resolve::{EmbeddedResolver, PathMapper, Resolver, Resolvers};
use crate::utils::retry::RetryPolicy;

/// Directory below the web root that embedded resources are extracted to.
const DEFAULT_EXTRACT_DIR: &str = ".packtag/embedded";

/// Builder for [`Engine`]. Every collaborator has a default.
pub struct EngineBuilder {
    debug: Arc<dyn DebugStatus>,
    web_root: Option<PathBuf>,
    app_path: String,
    embedded: Option<Arc<dyn Resolver>>,
    resolvers: Option<Resolvers>,
    hasher: Arc<dyn Hasher>,
    cache: Option<Arc<dyn BundleCache>>,
    named: Option<Arc<dyn BundleCache>>,
    ttl: Duration,
    watch: bool,
    retry: RetryPolicy,
    js_minifier: Arc<dyn Minifier>,
    css_minifier: Arc<dyn Minifier>,
    hash_key: String,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            debug: Arc::new(FixedDebugStatus(false)),
            web_root: None,
            app_path: "/".to_string(),
            embedded: None,
            resolvers: None,
            hasher: Arc::new(Blake3Hasher),
            cache: None,
            named: None,
            ttl: Duration::ZERO,
            watch: false,
            retry: RetryPolicy::default(),
            js_minifier: Arc::new(JsMinifier),
            css_minifier: Arc::new(CssMinifier),
            hash_key: DEFAULT_HASH_KEY.to_string(),
        }
    }

    /// Fixed engine-wide debug mode.
    pub fn debug(self, debug: bool) -> Self {
        self.debug_status(Arc::new(FixedDebugStatus(debug)))
    }

    pub fn debug_status(mut self, status: Arc<dyn DebugStatus>) -> Self {
        self.debug = status;
        self
    }

    /// Directory `~/` and relative paths resolve against. Defaults to the
    /// current directory.
    pub fn web_root(mut self, web_root: impl Into<PathBuf>) -> Self {
        self.web_root = Some(web_root.into());
        self
    }

    /// URL prefix `~/` expands to in markup. Defaults to `/`.
    pub fn app_path(mut self, app_path: impl Into<String>) -> Self {
        self.app_path = app_path.into();
        self
    }

    pub fn embedded(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.embedded = Some(resolver);
        self
    }

    /// Replace every resolver at once. Overrides `web_root`, `app_path`
    /// and `embedded`.
    pub fn resolvers(mut self, resolvers: Resolvers) -> Self {
        self.resolvers = Some(resolvers);
        self
    }

    pub fn hasher(mut self, hasher: Arc<dyn Hasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Cache for [`crate::bundle::Bundle::render`]. Defaults to an
    /// [`ApplicationCache`].
    pub fn cache(mut self, cache: Arc<dyn BundleCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Cache for named and cached bundles. Defaults to an
    /// [`ApplicationCache`].
    pub fn named_cache(mut self, cache: Arc<dyn BundleCache>) -> Self {
        self.named = Some(cache);
        self
    }

    /// Sliding expiration of the default application caches.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Watch dependent files of the default application caches.
    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn js_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.js_minifier = minifier;
        self
    }

    pub fn css_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.css_minifier = minifier;
        self
    }

    /// Default cache-busting query parameter for new bundles.
    pub fn hash_key(mut self, hash_key: impl Into<String>) -> Self {
        self.hash_key = hash_key.into();
        self
    }

    pub fn build(self) -> Result<Engine> {
        let resolvers = match self.resolvers {
            Some(resolvers) => resolvers,
            None => {
                let web_root = self
                    .web_root
                    .unwrap_or_else(|| PathMapper::default().web_root().to_path_buf());
                let paths = PathMapper::new(web_root, self.app_path);
                let embedded = self.embedded.unwrap_or_else(|| {
                    let dir = paths.web_root().join(DEFAULT_EXTRACT_DIR);
                    Arc::new(EmbeddedResolver::new(dir).with_retry(self.retry))
                });
                Resolvers::new(paths, embedded)
            }
        };

        let cache = match self.cache {
            Some(cache) => cache,
            None => application_cache(self.ttl, self.watch)?,
        };
        let named = match self.named {
            Some(named) => named,
            None => application_cache(self.ttl, self.watch)?,
        };

        let engine = Engine {
            inner: Arc::new(EngineInner {
                debug: self.debug,
                resolvers,
                hasher: self.hasher,
                cache,
                named,
                content: ContentStore::new(),
                retry: self.retry,
                js_minifier: self.js_minifier,
                css_minifier: self.css_minifier,
                hash_key: self.hash_key,
            }),
        };

        register_rerender(&engine, &engine.inner.cache);
        if !std::ptr::addr_eq(
            Arc::as_ptr(&engine.inner.cache),
            Arc::as_ptr(&engine.inner.named),
        ) {
            register_rerender(&engine, &engine.inner.named);
        }
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn application_cache(ttl: Duration, watch: bool) -> Result<Arc<dyn BundleCache>> {
    let cache = Arc::new(ApplicationCache::new().with_ttl(ttl));
    if watch {
        cache.watch()?;
    }
    Ok(cache)
}

/// Re-render entries evicted from `cache` for as long as the engine lives.
fn register_rerender(engine: &Engine, cache: &Arc<dyn BundleCache>) {
    let weak = engine.downgrade();
    let hook: EvictionHook = Arc::new(move |eviction: &Eviction| {
        if let Some(inner) = weak.upgrade() {
            Engine { inner }.rerender(eviction);
        }
    });
    cache.on_evict(hook);
}
