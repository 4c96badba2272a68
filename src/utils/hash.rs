//! Fast non-cryptographic hashing using FxHash.
//!
//! Used for cache-key fingerprints, where speed matters and the value
//! never leaves the process. Content digests that end up in URLs use
//! blake3 (see [`crate::freshness`]).
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint_of(&("js", 3)); // -> "00a1b2c3d4e5f607"
//! ```

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Compute a 16-char hex fingerprint of any hashable value.
#[inline]
pub fn fingerprint_of<T: Hash + ?Sized>(value: &T) -> String {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_width() {
        let fp = fingerprint_of(&("default", vec!["a.js", "b.js"]));
        assert_eq!(fp.len(), 16);
        assert_eq!(fp, fingerprint_of(&("default", vec!["a.js", "b.js"])));
        assert_ne!(fp, fingerprint_of(&("default", vec!["b.js", "a.js"])));
    }
}
