use feedlog_types::Sha1Digest;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {digest}: computed {computed}")]
    HashMismatch {
        digest: Sha1Digest,
        computed: Sha1Digest,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tempfile::PersistError> for StoreError {
    fn from(e: tempfile::PersistError) -> Self {
        Self::Io(e.error)
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
