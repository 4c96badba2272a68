//! In-memory cache without dependency tracking.

use std::sync::Arc;

use dashmap::DashMap;

use super::{BundleCache, CacheEntry, EvictionHook, EvictionReason, Hooks};

/// Plain concurrent map. Entries live until removed, replaced or cleared.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<CacheEntry>>,
    hooks: Hooks,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

impl BundleCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    fn set(&self, key: &str, entry: Arc<CacheEntry>) {
        let previous = self.entries.insert(key.to_string(), entry);
        if let Some(previous) = previous {
            self.hooks.fire(key, previous, EvictionReason::Replaced);
        }
    }

    fn remove(&self, key: &str) -> Option<Arc<CacheEntry>> {
        let (key, entry) = self.entries.remove(key)?;
        self.hooks.fire(&key, Arc::clone(&entry), EvictionReason::Removed);
        Some(entry)
    }

    fn clear(&self) {
        for key in self.keys() {
            if let Some((key, entry)) = self.entries.remove(&key) {
                self.hooks.fire(&key, entry, EvictionReason::Cleared);
            }
        }
    }

    fn on_evict(&self, hook: EvictionHook) {
        self.hooks.push(hook);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
