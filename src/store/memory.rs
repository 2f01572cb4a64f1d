//! In-memory store
//!
//! Mirrors the PostgreSQL queries over plain vectors. Availability and
//! latency can be toggled to exercise the failure paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::suggestion::MatchTier;
use crate::domain::trending::search_mentions_category;
use crate::domain::{
    Category, CategoryActivity, CategoryWithSubcategories, Listing, ListingFilter, SearchCount,
    SearchQueryRecord, Subcategory, SuggestionCandidate, TimeWindow,
};

use super::{MarketplaceStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    listings: Vec<Listing>,
    searches: Vec<SearchQueryRecord>,
}

impl MemoryState {
    fn category_for_listing(&self, listing: &Listing) -> Option<&Category> {
        let category_id = listing.category_id.or_else(|| {
            listing.subcategory_id.and_then(|sub_id| {
                self.subcategories
                    .iter()
                    .find(|sub| sub.id == sub_id)
                    .map(|sub| sub.category_id)
            })
        })?;
        self.categories.iter().find(|c| c.id == category_id)
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
    calls: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn insert_category(&self, category: Category) {
        self.state.write().await.categories.push(category);
    }

    /// Insert a subcategory; its category must already exist
    pub async fn insert_subcategory(&self, subcategory: Subcategory) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state
            .categories
            .iter()
            .any(|c| c.id == subcategory.category_id)
        {
            return Err(StoreError::Integrity(format!(
                "subcategory {} references missing category {}",
                subcategory.slug, subcategory.category_id
            )));
        }
        state.subcategories.push(subcategory);
        Ok(())
    }

    pub async fn insert_listing(&self, listing: Listing) {
        self.state.write().await.listings.push(listing);
    }

    /// Number of trait calls served so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of search records held
    pub async fn search_record_count(&self) -> usize {
        self.state.read().await.searches.len()
    }

    async fn gate(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.gate().await
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithSubcategories>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;

        Ok(state
            .categories
            .iter()
            .cloned()
            .map(|category| CategoryWithSubcategories::assemble(category, &state.subcategories))
            .collect())
    }

    async fn find_category(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryWithSubcategories>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;

        Ok(state
            .categories
            .iter()
            .find(|c| c.slug == slug)
            .cloned()
            .map(|category| CategoryWithSubcategories::assemble(category, &state.subcategories)))
    }

    async fn recent_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;

        let mut listings: Vec<Listing> = state
            .listings
            .iter()
            .filter(|listing| match &filter.category_slug {
                Some(slug) => state
                    .category_for_listing(listing)
                    .is_some_and(|c| &c.slug == slug),
                None => true,
            })
            .cloned()
            .collect();

        listings.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then_with(|| a.id.cmp(&b.id)));
        listings.truncate(filter.limit);
        Ok(listings)
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;
        Ok(state.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn suggestion_candidates(
        &self,
        normalized_query: &str,
        history_since: DateTime<Utc>,
        per_source: usize,
    ) -> Result<Vec<SuggestionCandidate>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;
        let matches = |text: &str| text.to_lowercase().contains(normalized_query);
        // Substring matches all classify, so the fallback tier is never used
        let tier = |text: &str| MatchTier::classify(text, normalized_query).unwrap_or(MatchTier::Substring);

        let mut listings: Vec<&Listing> =
            state.listings.iter().filter(|l| matches(&l.title)).collect();
        listings.sort_by(|a, b| {
            tier(&a.title)
                .cmp(&tier(&b.title))
                .then_with(|| b.posted_at.cmp(&a.posted_at))
        });

        let mut categories: Vec<&Category> = state
            .categories
            .iter()
            .filter(|c| c.is_active && matches(&c.name))
            .collect();
        categories.sort_by(|a, b| {
            tier(&a.name)
                .cmp(&tier(&b.name))
                .then_with(|| a.sort_order.cmp(&b.sort_order))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut subcategories: Vec<&Subcategory> = state
            .subcategories
            .iter()
            .filter(|s| {
                s.is_active
                    && matches(&s.name)
                    && state
                        .categories
                        .iter()
                        .any(|c| c.id == s.category_id && c.is_active)
            })
            .collect();
        subcategories.sort_by(|a, b| {
            tier(&a.name)
                .cmp(&tier(&b.name))
                .then_with(|| a.sort_order.cmp(&b.sort_order))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut history: HashMap<&str, (i64, DateTime<Utc>)> = HashMap::new();
        for record in state
            .searches
            .iter()
            .filter(|r| r.searched_at >= history_since && r.normalized_query.contains(normalized_query))
        {
            let entry = history
                .entry(record.normalized_query.as_str())
                .or_insert((0, record.searched_at));
            entry.0 += 1;
            entry.1 = entry.1.max(record.searched_at);
        }
        let mut history: Vec<_> = history.into_iter().collect();
        history.sort_by(|(qa, (ca, la)), (qb, (cb, lb))| {
            tier(qa)
                .cmp(&tier(qb))
                .then_with(|| cb.cmp(ca))
                .then_with(|| lb.cmp(la))
                .then_with(|| qa.cmp(qb))
        });

        let mut candidates = Vec::new();
        candidates.extend(
            categories
                .into_iter()
                .take(per_source)
                .map(|c| SuggestionCandidate::category(c.name.clone(), c.slug.clone())),
        );
        candidates.extend(
            subcategories
                .into_iter()
                .take(per_source)
                .map(|s| SuggestionCandidate::subcategory(s.name.clone(), s.slug.clone())),
        );
        candidates.extend(
            history
                .into_iter()
                .take(per_source)
                .map(|(query, (_, last))| SuggestionCandidate::search(query, last)),
        );
        candidates.extend(
            listings
                .into_iter()
                .take(per_source)
                .map(|l| SuggestionCandidate::listing(l.title.clone(), l.id, l.posted_at)),
        );

        Ok(candidates)
    }

    async fn record_search(&self, record: &SearchQueryRecord) -> Result<(), StoreError> {
        self.gate().await?;
        self.state.write().await.searches.push(record.clone());
        Ok(())
    }

    async fn search_counts(&self, window: &TimeWindow) -> Result<Vec<SearchCount>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;

        let mut grouped: HashMap<&str, SearchCount> = HashMap::new();
        for record in state.searches.iter().filter(|r| window.contains(r.searched_at)) {
            let entry = grouped
                .entry(record.normalized_query.as_str())
                .or_insert_with(|| SearchCount {
                    query: record.normalized_query.clone(),
                    count: 0,
                    last_searched_at: record.searched_at,
                });
            entry.count += 1;
            entry.last_searched_at = entry.last_searched_at.max(record.searched_at);
        }

        Ok(grouped.into_values().collect())
    }

    async fn category_activity(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<CategoryActivity>, StoreError> {
        self.gate().await?;
        let state = self.state.read().await;

        // (category, age_days) -> (listings, searches)
        let mut buckets: HashMap<(Uuid, i64), (i64, i64)> = HashMap::new();

        for listing in state.listings.iter().filter(|l| window.contains(l.posted_at)) {
            if let Some(category) = state.category_for_listing(listing) {
                let bucket = buckets
                    .entry((category.id, window.age_days(listing.posted_at)))
                    .or_default();
                bucket.0 += 1;
            }
        }

        for record in state.searches.iter().filter(|r| window.contains(r.searched_at)) {
            for category in state
                .categories
                .iter()
                .filter(|c| search_mentions_category(&record.normalized_query, &c.name))
            {
                let bucket = buckets
                    .entry((category.id, window.age_days(record.searched_at)))
                    .or_default();
                bucket.1 += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .filter_map(|((category_id, age_days), (listings, searches))| {
                let category = state
                    .categories
                    .iter()
                    .find(|c| c.id == category_id && c.is_active)?;
                Some(CategoryActivity {
                    category_id,
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                    icon: category.icon.clone(),
                    sort_order: category.sort_order,
                    age_days,
                    listings,
                    searches,
                })
            })
            .collect())
    }

    async fn purge_searches_before(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        self.gate().await?;
        let mut state = self.state.write().await;
        let before = state.searches.len();
        state.searches.retain(|r| r.searched_at >= cutoff);
        Ok((before - state.searches.len()) as u64)
    }
}
