//! Result limits
//!
//! Every list endpoint takes an optional `limit` with its own default and a
//! shared ceiling.

use super::DomainError;

/// Resolve a caller-supplied limit.
///
/// `None` yields `default`; values above `max` are clamped.
///
/// # Errors
/// - `DomainError::InvalidLimit` if the value is below 1
pub fn resolve_limit(requested: Option<i64>, default: usize, max: usize) -> Result<usize, DomainError> {
    match requested {
        None => Ok(default.min(max)),
        Some(value) if value < 1 => Err(DomainError::InvalidLimit(value)),
        Some(value) => Ok(usize::try_from(value).unwrap_or(usize::MAX).min(max)),
    }
}
