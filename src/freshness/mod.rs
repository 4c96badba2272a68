//! Freshness detection: blake3 content hashes and mtime stamps for the
//! files a cached render depends on.

mod hash;
pub mod mtime;
mod stamp;

pub use hash::{Blake3Hasher, ContentHash, DIGEST_HEX_LEN, Hasher, compute_file_hash};
pub use stamp::FileStamp;
