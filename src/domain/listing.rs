//! Listing (annonce)
//!
//! Classifieds posts are created by the publish flow elsewhere and are
//! read-only here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PriceFormat;

/// Default number of listings returned by the directory
pub const DEFAULT_LISTING_LIMIT: usize = 20;

/// A classifieds post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub location: String,
    pub image_url: String,
    pub posted_at: DateTime<Utc>,
    pub condition: String,
    pub seller_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<Uuid>,
}

impl Listing {
    /// Attach the display price
    pub fn into_view(self, format: &PriceFormat) -> ListingView {
        let formatted_price = format.format(self.price);
        ListingView {
            listing: self,
            formatted_price,
        }
    }
}

/// Listing as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    pub formatted_price: String,
}

/// Filter for the recent listings directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    /// Restrict to a category (by slug), including its subcategories
    pub category_slug: Option<String>,
    pub limit: usize,
}

impl ListingFilter {
    pub fn new(limit: usize) -> Self {
        Self {
            category_slug: None,
            limit,
        }
    }

    pub fn with_category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }
}
