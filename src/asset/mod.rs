//! Asset model and minification.

mod kind;
pub mod minify;
mod model;

pub use kind::{AssetKind, BundleKind};
pub use minify::{CssMinifier, JsMinifier, Minifier, NullMinifier};
pub use model::Asset;
