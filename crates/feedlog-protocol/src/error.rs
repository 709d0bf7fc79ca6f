use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The daemon answered `success: false`. The message is passed through
    /// verbatim.
    #[error("{endpoint} failed: {message}")]
    Remote { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}")]
    Http { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
