//! Shared helpers: hashing, paths and retrying file IO.

pub mod hash;
pub mod path;
pub mod retry;
