//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid search parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error(
        "Proposed probe at {proposed} tokens was clamped to {clamped}, which is already resolved"
    )]
    ClampCollision { proposed: u64, clamped: u64 },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Check if this error is caused by the run configuration rather than the endpoint
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidParameters(_) | DomainError::ClampCollision { .. }
        )
    }
}
