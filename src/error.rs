//! Error types for resolving, minifying and rendering bundles.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while rendering a bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    /// An asset locator could not be mapped to a file.
    #[error("cannot resolve `{locator}`: {reason}")]
    Resolve { locator: String, reason: String },

    /// Reading or writing a file failed (after retries for transient errors).
    #[error("IO error on `{}` after {attempts} attempt(s)", path.display())]
    Io {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: io::Error,
    },

    /// The minifier rejected its input.
    #[error("minifier `{minifier}` failed")]
    Minify {
        minifier: String,
        #[source]
        source: MinifyError,
    },

    /// No bundle was rendered under this name.
    #[error("no bundle named `{0}` has been rendered")]
    NamedNotFound(String),

    /// The file watcher could not be started.
    #[error("cannot watch dependent files")]
    Watch(#[from] notify::Error),

    /// No content was cached under this name.
    #[error("no cached content for bundle `{0}`")]
    CachedNotFound(String),
}

impl BundleError {
    pub(crate) fn resolve(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolve {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by a [`crate::asset::minify::Minifier`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct MinifyError {
    message: String,
}

impl MinifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T, E = BundleError> = std::result::Result<T, E>;
