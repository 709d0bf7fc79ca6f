//! Hashing and signing for feedlog.
//!
//! Provides SHA-1 content addressing, the canonical JSON encoding that
//! structured names and blobs are hashed over, subfeed hash derivation, and
//! the Ed25519 keys that own feeds and sign message envelopes.
//!
//! All crypto operations wrap established libraries; nothing here is custom
//! cryptography.

pub mod canonical;
pub mod hasher;
pub mod signer;
pub mod subfeed;

pub use canonical::{to_canonical_json, to_canonical_json_of};
pub use hasher::{ContentHasher, HasherError};
pub use signer::{
    Signature, SignatureError, SignedMessage, SignedMessageBody, SigningKey, VerifyingKey,
};
pub use subfeed::derive_subfeed_hash;
