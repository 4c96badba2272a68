//! Path and URL utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`)
//! - [`route`]: URL utilities (`split_query`, `join_url`, `url_to_safe_filename`)

pub mod fs;
pub mod route;

pub use fs::normalize_path;
pub use route::{join_url, split_query, url_to_safe_filename};
