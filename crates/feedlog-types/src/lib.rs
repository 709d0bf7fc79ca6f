//! Foundation types for feedlog.
//!
//! This crate provides the identifiers and addressing grammar shared by every
//! other feedlog crate. Nothing here performs I/O or hashing; subfeed hash
//! derivation lives in `feedlog-crypto`.
//!
//! # Key Types
//!
//! - [`FeedId`]: Opaque daemon-assigned feed identifier
//! - [`SubfeedHash`]: 40-hex identifier of one stream within a feed
//! - [`SubfeedName`]: Text or structured name a subfeed hash is derived from
//! - [`Sha1Digest`]: Content address of a stored blob
//! - [`FeedUri`]: Parsed `feed://` or `sha1://` URI
//! - [`Channel`]: Daemon routing label (`*local*` by default)

pub mod digest;
pub mod error;
pub mod ids;
pub mod name;
pub mod uri;

pub use digest::{Sha1Digest, SHA1_HEX_LEN};
pub use error::{TypeError, TypeResult};
pub use ids::{Channel, FeedId, SubfeedHash};
pub use name::{SubfeedName, LITERAL_HASH_PREFIX};
pub use uri::{live_feed_uri, parse_feed_uri, quote, sha1_uri, unquote, FeedUri};

/// A feed message: any JSON value. Immutable once appended.
pub type Message = serde_json::Value;
