//! Asset groups.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::asset::Asset;

/// A named subdivision of a bundle: its assets share one set of
/// attributes and render to one tag in release mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupBundle {
    assets: Vec<Asset>,
    attributes: IndexMap<String, String>,
    order: i32,
}

impl GroupBundle {
    pub fn new(order: i32) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Assets in insertion order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Position of the group within its bundle.
    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Add `asset` unless an identical one is already present.
    ///
    /// The asset's `order` is set to its insertion index. Returns `false`
    /// for duplicates.
    pub fn add(&mut self, asset: Asset) -> bool {
        let duplicate = self.assets.iter().any(|existing| {
            existing.local_path == asset.local_path
                && existing.remote_path == asset.remote_path
                && existing.is_embedded_resource == asset.is_embedded_resource
        });
        if duplicate {
            return false;
        }
        let order = i32::try_from(self.assets.len()).unwrap_or(i32::MAX);
        self.assets.push(asset.with_order(order));
        true
    }

    /// Drop every asset whose local or remote path equals `path`.
    ///
    /// Returns the number of removed assets.
    pub fn remove(&mut self, path: &str) -> usize {
        let before = self.assets.len();
        self.assets.retain(|asset| !asset.matches(path));
        before - self.assets.len()
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Upsert `attributes` when `merge` is set, replace the whole map otherwise.
    pub fn set_attributes<I, K, V>(&mut self, attributes: I, merge: bool)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if !merge {
            self.attributes.clear();
        }
        for (name, value) in attributes {
            self.attributes.insert(name.into(), value.into());
        }
    }
}

impl Hash for GroupBundle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.assets.hash(state);
        self.attributes.len().hash(state);
        for (name, value) in &self.attributes {
            name.hash(state);
            value.hash(state);
        }
        self.order.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates_and_orders() {
        let mut group = GroupBundle::new(0);
        assert!(group.add(Asset::local("~/js/a.js")));
        assert!(group.add(Asset::local("~/js/b.js")));
        assert!(!group.add(Asset::local("~/js/a.js")));

        let orders: Vec<_> = group.assets().iter().map(|a| a.order).collect();
        assert_eq!(orders, [0, 1]);
    }

    #[test]
    fn test_remove_matches_local_or_remote() {
        let mut group = GroupBundle::new(0);
        group.add(Asset::local("~/js/a.js"));
        group.add(Asset::remote("~/js/jquery.js", "https://cdn.example.com/jquery.js"));

        assert_eq!(group.remove("https://cdn.example.com/jquery.js"), 1);
        assert_eq!(group.remove("~/js/missing.js"), 0);
        assert_eq!(group.assets().len(), 1);
    }

    #[test]
    fn test_attributes_merge_or_replace() {
        let mut group = GroupBundle::new(0);
        group.set_attribute("defer", "defer");
        group.set_attributes([("charset", "utf-8")], true);
        assert_eq!(group.attributes().len(), 2);

        group.set_attributes([("async", "async")], false);
        let names: Vec<_> = group.attributes().keys().map(String::as_str).collect();
        assert_eq!(names, ["async"]);
    }
}
