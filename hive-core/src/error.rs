//! Error types for hive-core.

use thiserror::Error;

/// Result type alias using hive-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for hive storage operations
#[derive(Error, Debug)]
pub enum Error {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Unsupported schema version {found} (this build knows up to {supported})")]
    SchemaVersion { found: i64, supported: i64 },

    // Agent errors
    #[error("Invalid agent name: {0:?}")]
    InvalidAgentName(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
