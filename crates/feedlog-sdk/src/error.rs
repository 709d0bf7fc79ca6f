use feedlog_protocol::ProtocolError;
use feedlog_registry::RegistryError;
use feedlog_store::StoreError;
use feedlog_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Malformed URI. Raised before any request is made.
    #[error(transparent)]
    InvalidUri(#[from] TypeError),

    /// Append on a feed that cannot be written. Raised before any
    /// `appendMessages` request is made.
    #[error("cannot append to read-only feed {uri}")]
    ReadOnlyFeed { uri: String },

    #[error("no feed registered under name {name:?}")]
    FeedNotFound { name: String },

    /// The daemon reported failure or answered with a malformed body.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("cannot load snapshot {uri}: {reason}")]
    SnapshotLoad { uri: String, reason: String },

    #[error("feed {feed_id} has been deleted")]
    FeedDeleted { feed_id: String },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type FeedResult<T> = Result<T, FeedError>;
