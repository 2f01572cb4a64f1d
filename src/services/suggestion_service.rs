//! Search Suggestion Service
//!
//! Best-effort: short input never reaches the store, and store failures are
//! masked unless the read-failure policy says otherwise.

use std::sync::Arc;

use chrono::Utc;

use crate::config::ServiceSettings;
use crate::domain::suggestion::{rank_suggestions, DEFAULT_SUGGESTION_LIMIT};
use crate::domain::trending::instant_before;
use crate::domain::{resolve_limit, SearchQuery, SuggestionSet, SuggestionSource};
use crate::error::AppError;
use crate::store::MarketplaceStore;

use super::bounded;

/// Candidates fetched per source for every suggestion slot requested
const CANDIDATES_PER_SLOT: usize = 2;

/// Service for search-as-you-type suggestions
#[derive(Clone)]
pub struct SuggestionService {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl SuggestionService {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    /// Ranked suggestions for a partial query, at most `limit` (default 8)
    pub async fn get_suggestions(
        &self,
        raw_query: &str,
        limit: Option<i64>,
    ) -> Result<SuggestionSet, AppError> {
        let limit = resolve_limit(limit, DEFAULT_SUGGESTION_LIMIT, self.settings.max_result_limit)?;

        let Ok(query) = SearchQuery::parse(raw_query) else {
            return Ok(SuggestionSet::empty(SuggestionSource::None));
        };

        let history_since = instant_before(Utc::now(), self.settings.suggestion_history);
        let candidates = bounded(
            self.settings.store_timeout,
            "suggestion_candidates",
            self.store.suggestion_candidates(
                query.normalized(),
                history_since,
                limit * CANDIDATES_PER_SLOT,
            ),
        )
        .await;

        match candidates {
            Ok(candidates) => Ok(SuggestionSet {
                suggestions: rank_suggestions(candidates, query.normalized(), limit),
                source: SuggestionSource::Database,
            }),
            Err(e) if self.settings.masks_read_failures() => {
                tracing::warn!(error = %e, query = %query.normalized(), "Suggestion lookup failed, returning empty set");
                Ok(SuggestionSet::empty(SuggestionSource::Fallback))
            }
            Err(e) => Err(e.into()),
        }
    }
}
