//! Rendered content kept in memory.

use std::sync::Arc;

use dashmap::DashMap;

/// Shared map from cache key to minified content.
///
/// Cloning is cheap; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    entries: Arc<DashMap<String, String>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content`. Returns `false` if the same content was already there.
    pub fn put(&self, key: &str, content: &str) -> bool {
        if self.entries.get(key).is_some_and(|e| e.value() == content) {
            return false;
        }
        self.entries.insert(key.to_string(), content.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, content)| content)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
