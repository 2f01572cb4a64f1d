//! Listing Directory Service

use std::sync::Arc;

use uuid::Uuid;

use crate::config::ServiceSettings;
use crate::domain::listing::DEFAULT_LISTING_LIMIT;
use crate::domain::{resolve_limit, ListingFilter, ListingView};
use crate::error::AppError;
use crate::store::MarketplaceStore;

use super::bounded;

/// Service for browsing listings
#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl ListingService {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    /// Newest listings, optionally within one category (by slug)
    pub async fn recent_listings(
        &self,
        category_slug: Option<String>,
        limit: Option<i64>,
    ) -> Result<Vec<ListingView>, AppError> {
        let limit = resolve_limit(limit, DEFAULT_LISTING_LIMIT, self.settings.max_result_limit)?;

        let mut filter = ListingFilter::new(limit);
        if let Some(slug) = category_slug.filter(|s| !s.trim().is_empty()) {
            filter = filter.with_category(slug.trim());
        }

        let listings = bounded(
            self.settings.store_timeout,
            "recent_listings",
            self.store.recent_listings(&filter),
        )
        .await?;

        Ok(listings
            .into_iter()
            .map(|listing| listing.into_view(&self.settings.price_format))
            .collect())
    }

    /// One listing by id
    pub async fn get_listing(&self, id: Uuid) -> Result<ListingView, AppError> {
        let listing = bounded(
            self.settings.store_timeout,
            "find_listing",
            self.store.find_listing(id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Listing {}", id)))?;

        Ok(listing.into_view(&self.settings.price_format))
    }
}
