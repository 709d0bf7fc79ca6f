use std::io::Write;
use std::path::{Path, PathBuf};

use feedlog_crypto::ContentHasher;
use feedlog_types::Sha1Digest;
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::{verify_digest, BlobStore};

/// Directory-backed blob store.
///
/// Blobs live at `<root>/sha1/<aa>/<bb>/<cc>/<digest>`, where `aa`, `bb`
/// and `cc` are the first three byte pairs of the hex digest. Writes go to a
/// temporary file in the target directory and are renamed into place, so a
/// reader never sees a partial blob. Every read re-hashes the content.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Open (or lazily create) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `digest`.
    pub fn blob_path(&self, digest: &Sha1Digest) -> PathBuf {
        let hex = digest.to_hex();
        self.root
            .join("sha1")
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(&hex[4..6])
            .join(hex)
    }
}

impl BlobStore for LocalBlobStore {
    fn store_bytes(&self, data: &[u8]) -> StoreResult<Sha1Digest> {
        let digest = ContentHasher::hash(data);
        let path = self.blob_path(&digest);
        if path.exists() {
            return Ok(digest);
        }
        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)?;
        debug!(digest = %digest, bytes = data.len(), "stored blob");
        Ok(digest)
    }

    fn load_bytes(&self, digest: &Sha1Digest) -> StoreResult<Option<Vec<u8>>> {
        let data = match std::fs::read(self.blob_path(digest)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        verify_digest(digest, &data)?;
        Ok(Some(data))
    }

    fn exists(&self, digest: &Sha1Digest) -> StoreResult<bool> {
        Ok(self.blob_path(digest).is_file())
    }
}
