//! Domain Error Types
//!
//! Input validation failures that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These represent rejected input (queries, limits, prices) and are
/// independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Search query shorter than the minimum after trimming
    #[error("Search query must be at least {min} characters")]
    QueryTooShort { min: usize },

    /// Search query longer than the maximum after trimming
    #[error("Search query must be at most {max} characters")]
    QueryTooLong { max: usize },

    /// Result limit outside the accepted range
    #[error("Invalid limit: {0} (must be a positive integer)")]
    InvalidLimit(i64),

    /// Unknown price locale identifier
    #[error("Unsupported price locale: {0}")]
    UnsupportedLocale(String),
}

impl DomainError {
    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::QueryTooShort { .. } | Self::QueryTooLong { .. } | Self::InvalidLimit(_)
        )
    }
}
