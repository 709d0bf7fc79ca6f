use thiserror::Error;

/// Errors raised by daemon handlers.
///
/// Apart from [`ServerError::UnknownEndpoint`], these are reported to the
/// client as `{"success": false, "error": <message>}`.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("feed not found: {0}")]
    FeedNotFound(String),

    #[error("feed is not writeable: {0}")]
    ReadOnlyFeed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;
