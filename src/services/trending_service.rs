//! Trending Aggregation Service
//!
//! Recomputes rankings from the store on every call; nothing is cached.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::config::ServiceSettings;
use crate::domain::trending::{
    rank_categories, rank_searches, DEFAULT_TRENDING_CATEGORIES_LIMIT,
    DEFAULT_TRENDING_SEARCHES_LIMIT,
};
use crate::domain::{resolve_limit, TimeWindow, TrendingCategory, TrendingSearch};
use crate::error::{redact_credentials, AppError};
use crate::store::{MarketplaceStore, StoreError};

use super::bounded;

/// Trending result with its own success flag.
///
/// A masked store failure yields `success: false` and empty `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingOutcome<T> {
    pub success: bool,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> TrendingOutcome<T> {
    fn ok(data: Vec<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn degraded(error: String) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(error),
        }
    }
}

/// Service for trending categories and searches
#[derive(Clone)]
pub struct TrendingService {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl TrendingService {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    fn window(&self) -> TimeWindow {
        TimeWindow::trailing(self.settings.trending_window, Utc::now())
    }

    /// Top categories by recency-weighted activity (default 6)
    pub async fn get_trending_categories(
        &self,
        limit: Option<i64>,
    ) -> Result<TrendingOutcome<TrendingCategory>, AppError> {
        let limit = resolve_limit(
            limit,
            DEFAULT_TRENDING_CATEGORIES_LIMIT,
            self.settings.max_result_limit,
        )?;
        let window = self.window();

        let activity = bounded(
            self.settings.store_timeout,
            "category_activity",
            self.store.category_activity(&window),
        )
        .await;

        match activity {
            Ok(activity) => Ok(TrendingOutcome::ok(rank_categories(
                activity,
                &self.settings.trending_weights,
                limit,
            ))),
            Err(e) => self.degrade("Failed to fetch trending categories", e),
        }
    }

    /// Most frequent normalized searches in the window (default 10)
    pub async fn get_trending_searches(
        &self,
        limit: Option<i64>,
    ) -> Result<TrendingOutcome<TrendingSearch>, AppError> {
        let limit = resolve_limit(
            limit,
            DEFAULT_TRENDING_SEARCHES_LIMIT,
            self.settings.max_result_limit,
        )?;
        let window = self.window();

        let counts = bounded(
            self.settings.store_timeout,
            "search_counts",
            self.store.search_counts(&window),
        )
        .await;

        match counts {
            Ok(counts) => Ok(TrendingOutcome::ok(rank_searches(counts, limit))),
            Err(e) => self.degrade("Failed to fetch trending searches", e),
        }
    }

    fn degrade<T>(&self, message: &str, error: StoreError) -> Result<TrendingOutcome<T>, AppError> {
        if !self.settings.masks_read_failures() {
            return Err(error.into());
        }

        tracing::error!(error = %redact_credentials(&error.to_string()), "{}", message);
        Ok(TrendingOutcome::degraded(message.to_string()))
    }
}
