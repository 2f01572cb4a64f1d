//! Grabi Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod jobs;
pub mod services;
pub mod state;
pub mod store;

pub use config::{Config, ReadFailurePolicy, ServiceSettings};
pub use error::{AppError, AppResult};
pub use state::AppState;
pub use store::{MarketplaceStore, MemoryStore, PgStore, StoreError};
