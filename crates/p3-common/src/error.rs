//! Error types for P3

use thiserror::Error;

/// Result type alias for P3 operations
pub type Result<T> = std::result::Result<T, P3Error>;

/// Main error type for P3
#[derive(Error, Debug)]
pub enum P3Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl P3Error {
    /// Create an invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord(message.into())
    }
}
