//! Shared application state
//!
//! Cloned into every request. Services are cheap to build from it, so
//! handlers construct the one they need per call.

use std::sync::Arc;

use crate::config::ServiceSettings;
use crate::services::{
    bounded, CategoryService, ListingService, SuggestionService, TrackingService, TrendingService,
};
use crate::store::{MarketplaceStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn MarketplaceStore>,
    settings: ServiceSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn MarketplaceStore>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> Arc<dyn MarketplaceStore> {
        self.store.clone()
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn categories(&self) -> CategoryService {
        CategoryService::new(self.store(), self.settings.clone())
    }

    pub fn listings(&self) -> ListingService {
        ListingService::new(self.store(), self.settings.clone())
    }

    pub fn suggestions(&self) -> SuggestionService {
        SuggestionService::new(self.store(), self.settings.clone())
    }

    pub fn tracking(&self) -> TrackingService {
        TrackingService::new(self.store(), self.settings.clone())
    }

    pub fn trending(&self) -> TrendingService {
        TrendingService::new(self.store(), self.settings.clone())
    }

    /// Round-trip to the store within the configured timeout
    pub async fn ping_store(&self) -> Result<(), StoreError> {
        bounded(self.settings.store_timeout, "ping", self.store.ping()).await
    }
}
