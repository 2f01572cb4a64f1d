//! Data store module
//!
//! One async trait covers every read and write the services need. The
//! PostgreSQL implementation backs production; the in-memory one backs tests
//! and embedding.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CategoryActivity, CategoryWithSubcategories, Listing, ListingFilter, SearchCount,
    SearchQueryRecord, SuggestionCandidate, TimeWindow,
};

/// Data access used by the services
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Check that the store answers
    async fn ping(&self) -> Result<(), StoreError>;

    /// All categories with their subcategories, in any order
    async fn list_categories(&self) -> Result<Vec<CategoryWithSubcategories>, StoreError>;

    /// One category by slug
    async fn find_category(&self, slug: &str)
        -> Result<Option<CategoryWithSubcategories>, StoreError>;

    /// Newest listings first, restricted by the filter
    async fn recent_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError>;

    /// One listing by id
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    /// Case-insensitive substring matches of `normalized_query` among listing
    /// titles, active category and subcategory names, and past searches made
    /// since `history_since`. At most `per_source` candidates per source.
    async fn suggestion_candidates(
        &self,
        normalized_query: &str,
        history_since: DateTime<Utc>,
        per_source: usize,
    ) -> Result<Vec<SuggestionCandidate>, StoreError>;

    /// Append one search record
    async fn record_search(&self, record: &SearchQueryRecord) -> Result<(), StoreError>;

    /// Search records grouped by normalized query inside the window
    async fn search_counts(&self, window: &TimeWindow) -> Result<Vec<SearchCount>, StoreError>;

    /// Per-category, per-day activity of active categories inside the window
    async fn category_activity(&self, window: &TimeWindow)
        -> Result<Vec<CategoryActivity>, StoreError>;

    /// Delete search records older than `cutoff`, returning how many went
    async fn purge_searches_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;
}
