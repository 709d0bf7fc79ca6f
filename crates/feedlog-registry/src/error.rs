//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The feed name is invalid.
    #[error("invalid feed name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A stored value could not be interpreted.
    #[error("corrupt registry entry {key}: {value:?}")]
    CorruptEntry { key: String, value: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based registry operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
