use std::collections::HashMap;
use std::sync::RwLock;

use feedlog_crypto::ContentHasher;
use feedlog_types::Sha1Digest;

use crate::error::StoreResult;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock` and
/// cloned on read.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<Sha1Digest, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn store_bytes(&self, data: &[u8]) -> StoreResult<Sha1Digest> {
        let digest = ContentHasher::hash(data);
        let mut map = self.blobs.write().expect("lock poisoned");
        map.entry(digest).or_insert_with(|| data.to_vec());
        Ok(digest)
    }

    fn load_bytes(&self, digest: &Sha1Digest) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(digest).cloned())
    }

    fn exists(&self, digest: &Sha1Digest) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(digest))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
