use feedlog_types::Sha1Digest;
use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::canonical::{to_canonical_json, to_canonical_json_of};

/// SHA-1 content hasher.
///
/// Blobs are addressed by the plain SHA-1 of their bytes, with no domain
/// prefix, so digests match those computed by any other client of the
/// same daemon. JSON values are hashed over their canonical encoding.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash raw bytes.
    pub fn hash(data: &[u8]) -> Sha1Digest {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Sha1Digest::from_bytes(hasher.finalize().into())
    }

    /// Hash the UTF-8 bytes of a string.
    pub fn hash_str(s: &str) -> Sha1Digest {
        Self::hash(s.as_bytes())
    }

    /// Hash the canonical encoding of a JSON value.
    pub fn hash_json(value: &Value) -> Sha1Digest {
        Self::hash_str(&to_canonical_json(value))
    }

    /// Hash the canonical encoding of any serializable value.
    pub fn hash_serializable<T: serde::Serialize + ?Sized>(
        value: &T,
    ) -> Result<Sha1Digest, HasherError> {
        Ok(Self::hash_str(&to_canonical_json_of(value)?))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(data: &[u8], expected: &Sha1Digest) -> bool {
        Self::hash(data) == *expected
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_vectors() {
        assert_eq!(
            ContentHasher::hash(b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            ContentHasher::hash_str("abc").to_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ContentHasher::hash(data), ContentHasher::hash(data));
    }

    #[test]
    fn different_data_different_hash() {
        assert_ne!(ContentHasher::hash(b"a"), ContentHasher::hash(b"b"));
    }

    #[test]
    fn json_hash_ignores_key_order() {
        let a = json!({"x": 1, "y": [1, 2]});
        let b: Value = serde_json::from_str(r#"{"y":[1,2],"x":1}"#).unwrap();
        assert_eq!(ContentHasher::hash_json(&a), ContentHasher::hash_json(&b));
    }

    #[test]
    fn json_hash_is_hash_of_canonical_text() {
        let v = json!({"b": 2, "a": 1});
        assert_eq!(
            ContentHasher::hash_json(&v),
            ContentHasher::hash_str(r#"{"a":1,"b":2}"#)
        );
    }

    #[test]
    fn verify_matches() {
        let data = b"payload";
        let digest = ContentHasher::hash(data);
        assert!(ContentHasher::verify(data, &digest));
        assert!(!ContentHasher::verify(b"other", &digest));
    }
}
