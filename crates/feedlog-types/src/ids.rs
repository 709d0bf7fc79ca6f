use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::{Sha1Digest, SHA1_HEX_LEN};
use crate::error::TypeError;

/// Opaque identifier of a feed, assigned by the daemon on creation.
///
/// The client never interprets a `FeedId`; it only checks that it is usable
/// as a single URI path segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    /// Validate and wrap a feed id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() || id.contains(['/', '?', '#']) || id.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidFeedId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.char_indices().nth(8).map(|(i, _)| i).unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedId({})", self.short())
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one stream inside a feed.
///
/// Normally the 40-hex SHA-1 of the subfeed name. Names written as `~<hash>`
/// carry their hash literally; [`SubfeedHash::from_literal`] accepts those
/// without validation, since the caller asserts they are well formed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubfeedHash(String);

impl SubfeedHash {
    /// Parse a 40-hex hash, normalising to lowercase.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != SHA1_HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: SHA1_HEX_LEN,
                actual: s.len(),
            });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidHex(s.to_string()));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Wrap a hash taken verbatim from a `~`-prefixed name.
    pub fn from_literal(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The hash of a computed digest.
    pub fn from_digest(digest: &Sha1Digest) -> Self {
        Self(digest.to_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SubfeedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.len().min(8);
        write!(f, "SubfeedHash({})", self.0.get(..end).unwrap_or(&self.0))
    }
}

impl fmt::Display for SubfeedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing label scoping where the daemon looks for messages.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Channel(String);

impl Channel {
    /// The daemon-local channel.
    pub const LOCAL: &'static str = "*local*";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn local() -> Self {
        Self(Self::LOCAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_local(&self) -> bool {
        self.0 == Self::LOCAL
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
