//! Category Directory Service
//!
//! Read-only access to the category taxonomy.

use std::sync::Arc;

use crate::config::ServiceSettings;
use crate::domain::category::{order_directory, visible_category};
use crate::domain::CategoryWithSubcategories;
use crate::error::AppError;
use crate::store::MarketplaceStore;

use super::bounded;

/// Service for the category directory
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl CategoryService {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    /// Active categories by `sort_order`, each with its active subcategories
    /// by `sort_order`
    pub async fn get_all_categories(&self) -> Result<Vec<CategoryWithSubcategories>, AppError> {
        let entries = bounded(
            self.settings.store_timeout,
            "list_categories",
            self.store.list_categories(),
        )
        .await?;

        Ok(order_directory(entries))
    }

    /// One active category by slug
    pub async fn get_category(&self, slug: &str) -> Result<CategoryWithSubcategories, AppError> {
        let entry = bounded(
            self.settings.store_timeout,
            "find_category",
            self.store.find_category(slug),
        )
        .await?;

        entry
            .and_then(visible_category)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}'", slug)))
    }
}
