use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Number of hex characters in a SHA-1 digest.
pub const SHA1_HEX_LEN: usize = 40;

/// A SHA-1 digest, the content address of a stored blob.
///
/// Blobs are named `sha1://<hex>`; identical content always produces the
/// same digest. Serialized as a lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha1Digest([u8; 20]);

impl Sha1Digest {
    /// Wrap a pre-computed digest.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string (either case).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != SHA1_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: SHA1_HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Digest({})", self.short_hex())
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Sha1Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Sha1Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha1Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    #[test]
    fn hex_roundtrip() {
        let d = Sha1Digest::from_hex(EMPTY_SHA1).unwrap();
        assert_eq!(d.to_hex(), EMPTY_SHA1);
    }

    #[test]
    fn uppercase_hex_is_normalised() {
        let d = Sha1Digest::from_hex(&EMPTY_SHA1.to_uppercase()).unwrap();
        assert_eq!(d.to_hex(), EMPTY_SHA1);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = Sha1Digest::from_hex("abcd").unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 40, actual: 4 });
    }

    #[test]
    fn non_hex_rejected() {
        let bad = "z".repeat(40);
        assert!(matches!(Sha1Digest::from_hex(&bad), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn short_hex_is_8_chars() {
        let d = Sha1Digest::from_hex(EMPTY_SHA1).unwrap();
        assert_eq!(d.short_hex(), "da39a3ee");
    }

    #[test]
    fn serde_is_hex_string() {
        let d = Sha1Digest::from_hex(EMPTY_SHA1).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{EMPTY_SHA1}\""));
        let parsed: Sha1Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }
}
