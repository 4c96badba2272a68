//! Content hashing using blake3.
//!
//! [`ContentHash`] is the full 256-bit digest, used to compare dependency
//! contents. [`Hasher`] produces the public cache-busting token: the first
//! 128 bits of the digest as 32 upper-case hex characters.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Width of the public digest in hex characters.
pub const DIGEST_HEX_LEN: usize = 32;

/// Digest used in output file names and `?r=` query strings.
pub trait Hasher: Send + Sync {
    /// Hash `content` to a fixed-width hexadecimal digest.
    fn hash(&self, content: &[u8]) -> String;
}

/// Default [`Hasher`]: truncated blake3, upper-case hex.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash(&self, content: &[u8]) -> String {
        let digest = blake3::hash(content);
        hex::encode_upper(&digest.as_bytes()[..DIGEST_HEX_LEN / 2])
    }
}

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash an in-memory buffer.
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create a hash representing "no content" (all zeros).
    #[inline]
    pub const fn empty() -> Self {
        Self([0; 32])
    }

    /// Check if this is the empty/zero hash.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Convert to hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display first 16 chars of hex for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Compute blake3 hash of file contents.
///
/// Returns [`ContentHash::empty`] for missing or unreadable files.
pub fn compute_file_hash(path: &Path) -> ContentHash {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return ContentHash::empty(),
    };

    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => return ContentHash::empty(),
        }
    }

    ContentHash::new(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_content_hash_display() {
        let hash = ContentHash::new([0xab; 32]);
        assert_eq!(format!("{}", hash), "abababababababab");
    }

    #[test]
    fn test_blake3_hasher_is_fixed_width_upper_hex() {
        let digest = Blake3Hasher.hash(b"function sum(a,b){return a+b}");
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
        assert!(
            digest
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
        assert_eq!(digest, Blake3Hasher.hash(b"function sum(a,b){return a+b}"));
        assert_ne!(digest, Blake3Hasher.hash(b"function sum(a,b){return a-b}"));
    }

    #[test]
    fn test_hasher_matches_content_hash_prefix() {
        let content = b"body{color:red}";
        let digest = Blake3Hasher.hash(content);
        let full = ContentHash::of(content).to_hex().to_uppercase();
        assert!(full.starts_with(&digest));
    }

    #[test]
    fn test_compute_file_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.js");
        fs::write(&path, "hello()").unwrap();

        let hash1 = compute_file_hash(&path);
        let hash2 = compute_file_hash(&path);

        assert_eq!(hash1, hash2);
        assert!(!hash1.is_empty());
        assert_eq!(hash1, ContentHash::of(b"hello()"));

        fs::write(&path, "goodbye()").unwrap();
        assert_ne!(hash1, compute_file_hash(&path));
    }

    #[test]
    fn test_compute_file_hash_nonexistent() {
        let hash = compute_file_hash(Path::new("/nonexistent/file.js"));
        assert!(hash.is_empty());
    }
}
