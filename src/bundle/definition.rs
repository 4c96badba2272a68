//! The frozen part of a bundle: everything that determines its output.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::group::GroupBundle;
use crate::asset::{BundleKind, Minifier};
use crate::utils::hash::fingerprint_of;

/// Group every bundle starts with.
pub const DEFAULT_GROUP: &str = "default";

/// Default name of the cache-busting query parameter.
pub const DEFAULT_HASH_KEY: &str = "r";

/// How a bundle is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One tag per source file, untouched.
    Debug,
    /// One minified, content-hashed file per group.
    Release,
}

impl RenderMode {
    pub const fn from_debug(debug: bool) -> Self {
        if debug { Self::Debug } else { Self::Release }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

/// Transforms the concatenated sources right before minification.
pub trait Preprocessor: Send + Sync {
    /// Stable name, part of the cache key.
    fn name(&self) -> &'static str;

    fn before_minify(&self, content: String) -> String;
}

/// Groups, attributes and options of a bundle.
#[derive(Clone)]
pub struct BundleDefinition {
    pub(crate) kind: BundleKind,
    pub(crate) groups: IndexMap<String, GroupBundle>,
    pub(crate) minifier: Option<Arc<dyn Minifier>>,
    pub(crate) preprocessor: Option<Arc<dyn Preprocessor>>,
    pub(crate) hash_key_name: String,
    pub(crate) render_only_if_missing: bool,
    pub(crate) forced_mode: Option<RenderMode>,
}

impl BundleDefinition {
    pub fn new(kind: BundleKind) -> Self {
        let mut groups = IndexMap::new();
        groups.insert(DEFAULT_GROUP.to_string(), GroupBundle::new(0));
        Self {
            kind,
            groups,
            minifier: None,
            preprocessor: None,
            hash_key_name: DEFAULT_HASH_KEY.to_string(),
            render_only_if_missing: false,
            forced_mode: None,
        }
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Groups in creation order; `default` is always first.
    pub fn groups(&self) -> &IndexMap<String, GroupBundle> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&GroupBundle> {
        self.groups.get(name)
    }

    /// The group called `name`, created on first reference.
    pub fn group_mut(&mut self, name: &str) -> &mut GroupBundle {
        let next = i32::try_from(self.groups.len()).unwrap_or(i32::MAX);
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| GroupBundle::new(next))
    }

    pub fn hash_key_name(&self) -> &str {
        &self.hash_key_name
    }

    pub fn render_only_if_missing(&self) -> bool {
        self.render_only_if_missing
    }

    pub fn forced_mode(&self) -> Option<RenderMode> {
        self.forced_mode
    }

    pub fn minifier(&self) -> Option<&Arc<dyn Minifier>> {
        self.minifier.as_ref()
    }

    /// Fingerprint of everything that affects the output in `mode`.
    pub fn fingerprint(&self, mode: RenderMode) -> String {
        let groups: Vec<(&String, &GroupBundle)> = self.groups.iter().collect();
        fingerprint_of(&(
            self.kind,
            groups,
            self.minifier.as_ref().map(|m| m.name()),
            self.preprocessor.as_ref().map(|p| p.name()),
            &self.hash_key_name,
            self.render_only_if_missing,
            mode,
        ))
    }
}

impl fmt::Debug for BundleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleDefinition")
            .field("kind", &self.kind)
            .field("groups", &self.groups)
            .field("minifier", &self.minifier.as_ref().map(|m| m.name()))
            .field("preprocessor", &self.preprocessor.as_ref().map(|p| p.name()))
            .field("hash_key_name", &self.hash_key_name)
            .field("render_only_if_missing", &self.render_only_if_missing)
            .field("forced_mode", &self.forced_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, NullMinifier};

    #[test]
    fn test_default_group_always_present() {
        let mut def = BundleDefinition::new(BundleKind::JavaScript);
        assert!(def.group(DEFAULT_GROUP).is_some());

        def.group_mut("head");
        def.group_mut("head");
        let names: Vec<_> = def.groups().keys().map(String::as_str).collect();
        assert_eq!(names, [DEFAULT_GROUP, "head"]);
        assert_eq!(def.group("head").unwrap().order(), 1);
    }

    #[test]
    fn test_fingerprint_tracks_structure() {
        let mut def = BundleDefinition::new(BundleKind::JavaScript);
        def.group_mut(DEFAULT_GROUP).add(Asset::local("~/js/a.js"));
        let base = def.fingerprint(RenderMode::Release);

        assert_eq!(base, def.clone().fingerprint(RenderMode::Release));
        assert_ne!(base, def.fingerprint(RenderMode::Debug));

        let mut with_minifier = def.clone();
        with_minifier.minifier = Some(Arc::new(NullMinifier));
        assert_ne!(base, with_minifier.fingerprint(RenderMode::Release));

        let mut with_asset = def.clone();
        with_asset.group_mut(DEFAULT_GROUP).add(Asset::local("~/js/b.js"));
        assert_ne!(base, with_asset.fingerprint(RenderMode::Release));

        let mut with_attribute = def.clone();
        with_attribute
            .group_mut(DEFAULT_GROUP)
            .set_attribute("defer", "defer");
        assert_ne!(base, with_attribute.fingerprint(RenderMode::Release));
    }
}
