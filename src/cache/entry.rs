//! Cached values.

use std::path::PathBuf;

use crate::bundle::{BundleDefinition, RenderMode};
use crate::freshness::FileStamp;

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Markup for every group, in group order.
    pub tag: String,
    /// Local and embedded files read by the render.
    pub dependent_files: Vec<PathBuf>,
    /// One stamp per dependent file, taken before the file was read.
    pub stamps: Vec<FileStamp>,
    pub mode: RenderMode,
}

/// Where the rendered payload goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Written to the target path.
    File,
    /// Kept in the engine's content store under `name`.
    Cached { name: String },
}

/// Which engine cache an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// Keyed by target and bundle fingerprint.
    Default,
    /// Keyed by a caller-chosen name.
    Named,
}

/// Everything needed to repeat a render after eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub target: String,
    /// Cache key without the kind prefix.
    pub key: String,
    pub renderer: RendererKind,
    pub scope: CacheScope,
}

impl RenderContext {
    pub fn file(target: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            key: key.into(),
            renderer: RendererKind::File,
            scope: CacheScope::Default,
        }
    }

    pub fn named(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            key: name.into(),
            renderer: RendererKind::File,
            scope: CacheScope::Named,
        }
    }

    pub fn cached(name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            target: target.into(),
            key: name.clone(),
            renderer: RendererKind::Cached { name },
            scope: CacheScope::Named,
        }
    }
}

/// Immutable cache value: the result plus a frozen copy of the bundle
/// definition that produced it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: RenderResult,
    pub definition: BundleDefinition,
    pub context: RenderContext,
}
