//! Domain module
//!
//! Core marketplace types and the pure ranking/formatting logic.

pub mod category;
pub mod error;
pub mod limit;
pub mod listing;
pub mod price;
pub mod search;
pub mod suggestion;
pub mod trending;

pub use category::{Category, CategoryWithSubcategories, Subcategory};
pub use error::DomainError;
pub use limit::resolve_limit;
pub use listing::{Listing, ListingFilter, ListingView};
pub use price::{PriceFormat, PriceLocale};
pub use search::{SearchQuery, SearchQueryRecord};
pub use suggestion::{Suggestion, SuggestionCandidate, SuggestionKind, SuggestionSet, SuggestionSource};
pub use trending::{
    CategoryActivity, SearchCount, TimeWindow, TrendingCategory, TrendingSearch, TrendingWeights,
};
