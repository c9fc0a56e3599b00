//! Content hashing for bundle fingerprints and entity tags.

use serde::{Serialize, Serializer};
use std::fmt;

/// A 128-bit XXH3 hash of some byte content.
///
/// Sheaf uses it in two places: hashing the ordered source list of a bundle
/// to name its cache artifact, and hashing the compiled stylesheet to
/// produce the `ETag` sent to clients.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Returns the first eight hex characters, for log lines.
    pub fn short(&self) -> String {
        let mut s = self.to_string();
        s.truncate(8);
        s
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Serializes as the same 32-character hex string as `Display`.
impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"body { color: red; }");
        let b = ContentHash::from_bytes(b"body { color: red; }");
        assert_eq!(a, b);
    }

    #[test]
    fn one_byte_difference_changes_hash() {
        let a = ContentHash::from_bytes(b"a.less,b.less-1");
        let b = ContentHash::from_bytes(b"a.less,b.less-");
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_32_hex_chars() {
        let s = ContentHash::from_bytes(b"test").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn short_is_display_prefix() {
        let h = ContentHash::from_bytes(b"prefix");
        assert_eq!(h.short().len(), 8);
        assert!(h.to_string().starts_with(&h.short()));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::from_bytes(b"test"));
        assert!(s.starts_with("ContentHash("));
        assert_eq!(s.len(), "ContentHash()".len() + 8);
    }

    #[test]
    fn serializes_as_hex_string() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_value(h).unwrap();
        assert_eq!(json, serde_json::Value::String(h.to_string()));
    }
}
