//! Render caches.
//!
//! # Module Structure
//!
//! - `entry` - immutable cached values and the context needed to rebuild them
//! - `memory` - plain concurrent map, no dependency tracking
//! - `application` - process-lifetime cache tied to dependent file changes
//! - `watch` - notify-backed file watching for [`ApplicationCache`]
//!
//! Every cache notifies registered [`EvictionHook`]s after an entry leaves
//! the map. Hooks never run while a map shard is locked, so a hook may
//! read from or write back into the same cache.

mod application;
mod entry;
mod memory;
mod watch;

use std::sync::Arc;

use parking_lot::RwLock;

pub use application::ApplicationCache;
pub use entry::{CacheEntry, CacheScope, RenderContext, RenderResult, RendererKind};
pub use memory::MemoryCache;

/// Callback invoked after an entry was evicted.
pub type EvictionHook = Arc<dyn Fn(&Eviction) + Send + Sync>;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// A dependent file changed or disappeared.
    DependencyChanged,
    /// The sliding expiration elapsed.
    Expired,
    /// `remove` was called for the key.
    Removed,
    /// `set` overwrote the entry.
    Replaced,
    /// `clear` emptied the cache.
    Cleared,
}

impl EvictionReason {
    /// Whether the evicted bundle should render itself again.
    /// Removal, overwrite and clear never re-render.
    pub const fn should_rerender(self) -> bool {
        matches!(self, Self::DependencyChanged | Self::Expired)
    }
}

/// Notification passed to eviction hooks.
#[derive(Debug, Clone)]
pub struct Eviction {
    pub key: String,
    pub entry: Arc<CacheEntry>,
    pub reason: EvictionReason,
}

/// Key to render-result store shared by all bundles of an engine.
pub trait BundleCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<CacheEntry>>;

    /// Store `entry`; its dependent files travel with it.
    fn set(&self, key: &str, entry: Arc<CacheEntry>);

    fn remove(&self, key: &str) -> Option<Arc<CacheEntry>>;

    fn clear(&self);

    /// Register a hook fired after every eviction.
    fn on_evict(&self, hook: EvictionHook);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict every stale entry now instead of on its next lookup.
    ///
    /// Returns the number of evicted entries. Caches without expiry or
    /// dependency tracking have nothing to sweep.
    fn sweep(&self) -> usize {
        0
    }
}

/// Registered eviction hooks.
#[derive(Default)]
pub(crate) struct Hooks {
    hooks: RwLock<Vec<EvictionHook>>,
}

impl Hooks {
    pub(crate) fn push(&self, hook: EvictionHook) {
        self.hooks.write().push(hook);
    }

    /// Run every hook. The hook list is copied first so a hook may
    /// register further hooks.
    pub(crate) fn fire(&self, key: &str, entry: Arc<CacheEntry>, reason: EvictionReason) {
        let hooks = self.hooks.read().clone();
        if hooks.is_empty() {
            return;
        }
        crate::debug!("cache"; "evicted {} ({:?})", key, reason);
        let eviction = Eviction {
            key: key.to_string(),
            entry,
            reason,
        };
        for hook in &hooks {
            hook(&eviction);
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("len", &self.hooks.read().len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::asset::BundleKind;
    use crate::bundle::{BundleDefinition, RenderMode};
    use crate::freshness::FileStamp;

    pub fn entry(tag: &str, dependent_files: Vec<PathBuf>) -> Arc<CacheEntry> {
        Arc::new(CacheEntry {
            result: RenderResult {
                tag: tag.to_string(),
                stamps: dependent_files.iter().map(|path| FileStamp::capture(path)).collect(),
                dependent_files,
                mode: RenderMode::Release,
            },
            definition: BundleDefinition::new(BundleKind::JavaScript),
            context: RenderContext::file("out/site.js", "out/site.js"),
        })
    }

    /// Records every eviction reason it sees.
    pub fn recorder(cache: &dyn BundleCache) -> Arc<Mutex<Vec<(String, EvictionReason)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cache.on_evict(Arc::new(move |eviction: &Eviction| {
            sink.lock().push((eviction.key.clone(), eviction.reason));
        }));
        seen
    }
}
