//! Process-lifetime cache with dependency-based invalidation.
//!
//! Each entry carries a [`FileStamp`] per dependent file. A lookup that
//! finds a changed, removed or expired dependency evicts the entry, runs
//! the eviction hooks and then answers with whatever the hooks stored.
//! With [`ApplicationCache::watch`] enabled, changes are picked up as
//! soon as the file system reports them.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use super::watch::DirWatcher;
use super::{BundleCache, CacheEntry, EvictionHook, EvictionReason, Hooks};
use crate::freshness::FileStamp;

struct Slot {
    entry: Arc<CacheEntry>,
    stamps: Vec<FileStamp>,
    last_access: Mutex<Instant>,
}

impl Slot {
    fn new(entry: Arc<CacheEntry>) -> Self {
        let stamps = entry.result.stamps.clone();
        Self {
            entry,
            stamps,
            last_access: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    fn staleness(&self, ttl: Option<Duration>) -> Option<EvictionReason> {
        if let Some(ttl) = ttl
            && self.last_access.lock().elapsed() > ttl
        {
            return Some(EvictionReason::Expired);
        }
        if self.stamps.iter().any(|stamp| !stamp.is_current()) {
            return Some(EvictionReason::DependencyChanged);
        }
        None
    }

    fn depends_on(&self, path: &Path) -> bool {
        self.stamps.iter().any(|stamp| stamp.path() == path)
    }
}

/// Dependency-tracked cache shared across requests.
#[derive(Default)]
pub struct ApplicationCache {
    slots: DashMap<String, Arc<Slot>>,
    ttl: Option<Duration>,
    hooks: Hooks,
    watcher: Mutex<Option<DirWatcher>>,
}

impl ApplicationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict entries not read for `ttl`. A zero duration disables expiry.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = (!ttl.is_zero()).then_some(ttl);
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Start watching the directories of every dependent file.
    ///
    /// The watcher lives as long as the cache; its thread exits once the
    /// cache is dropped.
    pub fn watch(self: &Arc<Self>) -> notify::Result<()> {
        let mut guard = self.watcher.lock();
        if guard.is_some() {
            return Ok(());
        }
        let mut watcher = DirWatcher::spawn(Arc::downgrade(self))?;
        for slot in self.slots.iter() {
            for stamp in &slot.stamps {
                watcher.attach_parent(stamp.path());
            }
        }
        *guard = Some(watcher);
        Ok(())
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    /// Number of directories the watcher is attached to.
    pub fn watched_dirs(&self) -> usize {
        self.watcher.lock().as_ref().map_or(0, DirWatcher::attached)
    }

    /// Evict every entry depending on `path` whose stamp no longer matches.
    ///
    /// Returns the number of evicted entries.
    pub fn invalidate_path(&self, path: &Path) -> usize {
        let candidates: Vec<(String, Arc<Slot>)> = self
            .slots
            .iter()
            .filter(|slot| slot.depends_on(path))
            .map(|slot| (slot.key().clone(), Arc::clone(slot.value())))
            .collect();

        candidates
            .into_iter()
            .filter(|(key, slot)| {
                let stale = slot
                    .stamps
                    .iter()
                    .any(|stamp| stamp.path() == path && !stamp.is_current());
                stale && self.evict(key, slot, EvictionReason::DependencyChanged)
            })
            .count()
    }

    /// Remove `slot` if it is still the one stored under `key`, then fire
    /// the hooks. Returns `false` if another thread replaced or removed it.
    fn evict(&self, key: &str, slot: &Arc<Slot>, reason: EvictionReason) -> bool {
        let removed = self
            .slots
            .remove_if(key, |_, current| Arc::ptr_eq(current, slot));
        match removed {
            Some((key, slot)) => {
                self.hooks.fire(&key, Arc::clone(&slot.entry), reason);
                true
            }
            None => false,
        }
    }
}

impl BundleCache for ApplicationCache {
    fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let slot = self.slots.get(key).map(|slot| Arc::clone(slot.value()))?;
        let Some(reason) = slot.staleness(self.ttl) else {
            slot.touch();
            return Some(Arc::clone(&slot.entry));
        };

        self.evict(key, &slot, reason);
        // Hooks may have rendered a fresh entry under the same key.
        let slot = self.slots.get(key).map(|slot| Arc::clone(slot.value()))?;
        slot.touch();
        Some(Arc::clone(&slot.entry))
    }

    fn set(&self, key: &str, entry: Arc<CacheEntry>) {
        let slot = Arc::new(Slot::new(entry));
        if let Some(watcher) = self.watcher.lock().as_mut() {
            for stamp in &slot.stamps {
                watcher.attach_parent(stamp.path());
            }
        }
        if let Some(previous) = self.slots.insert(key.to_string(), slot) {
            self.hooks
                .fire(key, Arc::clone(&previous.entry), EvictionReason::Replaced);
        }
    }

    fn remove(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let (key, slot) = self.slots.remove(key)?;
        self.hooks
            .fire(&key, Arc::clone(&slot.entry), EvictionReason::Removed);
        Some(Arc::clone(&slot.entry))
    }

    fn clear(&self) {
        let keys: Vec<String> = self.slots.iter().map(|slot| slot.key().clone()).collect();
        for key in keys {
            if let Some((key, slot)) = self.slots.remove(&key) {
                self.hooks
                    .fire(&key, Arc::clone(&slot.entry), EvictionReason::Cleared);
            }
        }
    }

    fn on_evict(&self, hook: EvictionHook) {
        self.hooks.push(hook);
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn sweep(&self) -> usize {
        let slots: Vec<(String, Arc<Slot>)> = self
            .slots
            .iter()
            .map(|slot| (slot.key().clone(), Arc::clone(slot.value())))
            .collect();

        slots
            .into_iter()
            .filter(|(key, slot)| match slot.staleness(self.ttl) {
                Some(reason) => self.evict(key, slot, reason),
                None => false,
            })
            .count()
    }
}

impl std::fmt::Debug for ApplicationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationCache")
            .field("len", &self.slots.len())
            .field("ttl", &self.ttl)
            .field("watching", &self.is_watching())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::{entry, recorder};
    use std::fs;
    use tempfile::TempDir;

    fn rewrite(path: &Path, content: &str) {
        std::thread::sleep(Duration::from_millis(20));
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_hit_while_dependencies_unchanged() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = ApplicationCache::new();
        cache.set("jsout", entry("<a>", vec![file.clone()]));
        assert_eq!(cache.get("jsout").unwrap().result.tag, "<a>");

        // Same bytes, new mtime: still a hit.
        rewrite(&file, "a()");
        assert!(cache.get("jsout").is_some());
    }

    #[test]
    fn test_dependency_change_evicts_on_get() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = ApplicationCache::new();
        let seen = recorder(&cache);
        cache.set("jsout", entry("<a>", vec![file.clone()]));

        rewrite(&file, "b()");
        assert!(cache.get("jsout").is_none());
        assert_eq!(
            *seen.lock(),
            vec![("jsout".to_string(), EvictionReason::DependencyChanged)]
        );
    }

    #[test]
    fn test_removed_dependency_evicts() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = ApplicationCache::new();
        cache.set("jsout", entry("<a>", vec![file.clone()]));
        fs::remove_file(&file).unwrap();
        assert!(cache.get("jsout").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_edit_between_render_and_set_is_stale() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = ApplicationCache::new();
        let seen = recorder(&cache);
        // Stamped while rendering; the file changes before the entry is stored.
        let rendered = entry("<a>", vec![file.clone()]);
        rewrite(&file, "b()");
        cache.set("jsout", rendered);

        assert!(cache.get("jsout").is_none());
        assert_eq!(
            *seen.lock(),
            vec![("jsout".to_string(), EvictionReason::DependencyChanged)]
        );
    }

    #[test]
    fn test_get_returns_entry_stored_by_hook() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = Arc::new(ApplicationCache::new());
        let weak = Arc::downgrade(&cache);
        let dependency = file.clone();
        cache.on_evict(Arc::new(move |eviction: &crate::cache::Eviction| {
            if eviction.reason.should_rerender()
                && let Some(cache) = weak.upgrade()
            {
                cache.set(&eviction.key, entry("<fresh>", vec![dependency.clone()]));
            }
        }));

        cache.set("jsout", entry("<stale>", vec![file.clone()]));
        rewrite(&file, "b()");
        assert_eq!(cache.get("jsout").unwrap().result.tag, "<fresh>");
        assert_eq!(cache.get("jsout").unwrap().result.tag, "<fresh>");
    }

    #[test]
    fn test_invalidate_path_only_touches_stale_dependents() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        fs::write(&a, "a()").unwrap();
        fs::write(&b, "b()").unwrap();

        let cache = ApplicationCache::new();
        cache.set("jsa", entry("<a>", vec![a.clone()]));
        cache.set("jsb", entry("<b>", vec![b.clone()]));

        // Unchanged file: nothing to do.
        assert_eq!(cache.invalidate_path(&a), 0);

        rewrite(&a, "a2()");
        assert_eq!(cache.invalidate_path(&a), 1);
        assert!(cache.get("jsa").is_none());
        assert!(cache.get("jsb").is_some());
    }

    #[test]
    fn test_sliding_expiration() {
        let cache = ApplicationCache::new().with_ttl(Duration::from_millis(50));
        let seen = recorder(&cache);
        cache.set("jsout", entry("<a>", vec![]));

        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get("jsout").is_some());

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.sweep(), 1);
        assert!(cache.get("jsout").is_none());
        assert_eq!(
            *seen.lock(),
            vec![("jsout".to_string(), EvictionReason::Expired)]
        );
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let cache = ApplicationCache::new().with_ttl(Duration::ZERO);
        assert_eq!(cache.ttl(), None);
    }

    #[test]
    fn test_explicit_clear_and_remove_reasons() {
        let cache = ApplicationCache::new();
        let seen = recorder(&cache);
        cache.set("jsa", entry("<a>", vec![]));
        cache.set("jsb", entry("<b>", vec![]));
        cache.remove("jsa");
        cache.clear();

        let reasons: Vec<_> = seen.lock().iter().map(|(_, r)| *r).collect();
        assert_eq!(reasons, [EvictionReason::Removed, EvictionReason::Cleared]);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_watch_attaches_dependency_dirs() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "a()").unwrap();

        let cache = Arc::new(ApplicationCache::new());
        cache.set("jsout", entry("<a>", vec![file.clone()]));
        cache.watch().unwrap();
        assert!(cache.is_watching());
        assert_eq!(cache.watched_dirs(), 1);

        // Second watch is a no-op.
        cache.watch().unwrap();
        assert_eq!(cache.watched_dirs(), 1);
    }
}
