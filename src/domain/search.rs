//! Search queries
//!
//! Validated query text and the append-only record the tracker writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Minimum characters of a meaningful query (after trimming)
pub const MIN_QUERY_CHARS: usize = 2;

/// Maximum characters accepted for a query (after trimming)
pub const MAX_QUERY_CHARS: usize = 200;

/// A search query that passed validation.
///
/// # Invariants
/// - `text` is trimmed and between 2 and 200 characters
/// - `normalized` is `text` lowercased with inner whitespace collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    normalized: String,
}

impl SearchQuery {
    /// Validate raw user input.
    ///
    /// # Errors
    /// - `DomainError::QueryTooShort` if fewer than 2 characters remain after trimming
    /// - `DomainError::QueryTooLong` if more than 200 characters remain
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let text = raw.trim();
        let chars = text.chars().count();

        if chars < MIN_QUERY_CHARS {
            return Err(DomainError::QueryTooShort {
                min: MIN_QUERY_CHARS,
            });
        }
        if chars > MAX_QUERY_CHARS {
            return Err(DomainError::QueryTooLong {
                max: MAX_QUERY_CHARS,
            });
        }

        Ok(Self {
            text: text.to_string(),
            normalized: normalize_query(text),
        })
    }

    /// Trimmed text as typed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Grouping key used for trending and history matching
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Lowercase and collapse whitespace runs to a single space
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One tracked search. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryRecord {
    pub id: Uuid,
    pub query: String,
    pub normalized_query: String,
    pub searched_at: DateTime<Utc>,
}

impl SearchQueryRecord {
    pub fn new(query: &SearchQuery, searched_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.text().to_string(),
            normalized_query: query.normalized().to_string(),
            searched_at,
        }
    }
}

/// Escape `%`, `_` and `\` for use inside a SQL `LIKE` pattern
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
