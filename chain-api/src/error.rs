//! Error types for the query layer

use thiserror::Error;

/// Result type for query operations
pub type Result<T> = std::result::Result<T, Error>;

/// Query layer errors
#[derive(Error, Debug)]
pub enum Error {
    /// Error raised by the chain core
    #[error("Chain error: {0}")]
    Chain(#[from] chain_core::Error),

    /// Requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request arguments rejected before touching state
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<chain_core::ValidationError> for Error {
    fn from(err: chain_core::ValidationError) -> Self {
        Error::Chain(err.into())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
