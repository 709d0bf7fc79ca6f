use feedlog_crypto::{to_canonical_json, ContentHasher};
use feedlog_types::{sha1_uri, Sha1Digest};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written. The digest is the SHA-1 of the bytes,
///   so the same data always produces the same digest.
/// - Writing an existing blob is a no-op.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobStore: Send + Sync {
    /// Store raw bytes and return their digest.
    fn store_bytes(&self, data: &[u8]) -> StoreResult<Sha1Digest>;

    /// Read a blob by digest.
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn load_bytes(&self, digest: &Sha1Digest) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether a blob exists in the store.
    fn exists(&self, digest: &Sha1Digest) -> StoreResult<bool>;

    /// Store a JSON document under the digest of its canonical encoding.
    fn store_json(&self, value: &Value) -> StoreResult<Sha1Digest> {
        self.store_bytes(to_canonical_json(value).as_bytes())
    }

    /// Load and parse a JSON document.
    fn load_json(&self, digest: &Sha1Digest) -> StoreResult<Option<Value>> {
        match self.load_bytes(digest)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    /// The `sha1://` URI naming a stored blob.
    fn uri_for(&self, digest: &Sha1Digest) -> String {
        sha1_uri(digest)
    }
}

/// Check that `data` hashes to `digest`.
pub(crate) fn verify_digest(digest: &Sha1Digest, data: &[u8]) -> StoreResult<()> {
    let computed = ContentHasher::hash(data);
    if computed != *digest {
        return Err(StoreError::HashMismatch {
            digest: *digest,
            computed,
        });
    }
    Ok(())
}
