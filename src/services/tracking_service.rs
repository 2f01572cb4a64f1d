//! Search Tracking Service
//!
//! Appends one record per tracked search. Repeated searches produce repeated
//! records; frequency is what trending consumes.

use std::sync::Arc;

use chrono::Utc;

use crate::config::ServiceSettings;
use crate::domain::{SearchQuery, SearchQueryRecord};
use crate::error::AppError;
use crate::store::MarketplaceStore;

use super::bounded;

/// Service recording submitted searches
#[derive(Clone)]
pub struct TrackingService {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl TrackingService {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    /// Validate and record a search.
    ///
    /// Write failures are always surfaced, whatever the read-failure policy.
    pub async fn track_search(&self, raw_query: &str) -> Result<SearchQueryRecord, AppError> {
        let query = SearchQuery::parse(raw_query)
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;

        let record = SearchQueryRecord::new(&query, Utc::now());

        bounded(
            self.settings.store_timeout,
            "record_search",
            self.store.record_search(&record),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, query = %record.normalized_query, "Failed to record search");
            AppError::from(e)
        })?;

        tracing::debug!(query = %record.normalized_query, "Search tracked");
        Ok(record)
    }
}
