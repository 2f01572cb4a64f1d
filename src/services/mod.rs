//! Services module
//!
//! One service per resource. Each wraps store calls in the configured
//! timeout and decides how store failures reach the route layer.

mod category_service;
mod listing_service;
mod suggestion_service;
mod tracking_service;
mod trending_service;


pub use category_service::CategoryService;
pub use listing_service::ListingService;
pub use suggestion_service::SuggestionService;
pub use tracking_service::TrackingService;
pub use trending_service::{TrendingOutcome, TrendingService};

use std::future::Future;
use std::time::Duration;

use crate::store::StoreError;

/// Run a store call, failing with `StoreError::Timeout` after `timeout`
pub(crate) async fn bounded<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout {
            operation,
            after: timeout,
        }),
    }
}
