//! Store Errors
//!
//! Error types for data store operations.

use std::time::Duration;

/// Errors that can occur while talking to the data store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The call did not finish within the configured bound
    #[error("Store operation '{operation}' timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Store cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Write would break a referential invariant
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl StoreError {
    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }

    /// Check if the store itself is unreachable (as opposed to a bad write)
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) | StoreError::Timeout { .. } => true,
            StoreError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            StoreError::Integrity(_) => false,
        }
    }
}
