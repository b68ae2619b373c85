//! Error types for wgmesh

use thiserror::Error;

/// Result type alias using wgmesh Error
pub type Result<T> = std::result::Result<T, Error>;

/// wgmesh error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Resource not found: {kind} with id {id}")]
    NotFound { kind: String, id: String },

    #[error("Resource already exists: {kind} with id {id}")]
    AlreadyExists { kind: String, id: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Address space exhausted in {cidr}")]
    AddressSpaceExhausted { cidr: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Deployment step '{step}' failed: {output}")]
    Deployment { step: String, output: String },

    #[error("Host unreachable: {0}")]
    Unreachable(String),

    #[error("Operation timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error means "no information", not "known bad state".
    /// Reconciliation skips status updates for these.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::Unreachable(_) | Error::Timeout { .. })
    }
}
