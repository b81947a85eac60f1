//! Memory Engine Error Types

use thiserror::Error;

/// Memory engine Result type alias
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory engine errors
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Owner name does not resolve to a registered agent
    #[error("agent not found: {0}")]
    OwnerNotFound(String),

    /// Memory id unknown to this owner
    #[error("memory {id} not found for agent {owner}")]
    MemoryNotFound { owner: String, id: i64 },

    /// Storage layer failure
    #[error("storage error: {0}")]
    Storage(#[from] hive_core::Error),

    /// Rejected input
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),
}

impl MemoryError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Unknown owner or unknown memory
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OwnerNotFound(_) | Self::MemoryNotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
