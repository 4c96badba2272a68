//! packtag - front-end asset bundling with render caching.
//!
//! A [`Bundle`] collects JavaScript or CSS assets into groups and renders
//! them to markup. In debug mode every source file gets its own tag; in
//! release mode each group is concatenated, minified, hashed and written
//! to one file whose tag carries the hash. Renders are cached per target
//! and evicted, then re-rendered, when a source file changes.
//!
//! ```ignore
//! use packtag::Engine;
//!
//! let engine = Engine::builder().web_root("site").build()?;
//! let tag = engine
//!     .javascript()
//!     .add(["~/js/jquery.js", "~/js/site.js"])
//!     .with_attribute("defer", "defer")
//!     .render("~/js/site_#.js")?;
//! ```

pub mod logger;

pub mod asset;
pub mod bundle;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod render;
pub mod resolve;
pub mod utils;

pub use asset::{Asset, BundleKind, CssMinifier, JsMinifier, Minifier, NullMinifier};
pub use bundle::{Bundle, BundleDefinition, Preprocessor, RenderMode};
pub use cache::{ApplicationCache, BundleCache, MemoryCache};
pub use engine::{Engine, EngineBuilder};
pub use error::{BundleError, MinifyError, Result};
