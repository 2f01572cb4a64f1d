//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{PriceFormat, PriceLocale, TrendingWeights};

/// Upper bound for every day-valued setting (ten years)
const MAX_DAYS: i64 = 3650;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Upper bound on a single store call, in milliseconds
    pub store_timeout_ms: u64,

    /// Degrade suggestions/trending to empty results when the store fails
    pub mask_read_failures: bool,

    /// Ceiling applied to every `limit` parameter
    pub max_result_limit: usize,

    /// Trending recency window, in days
    pub trending_window_days: i64,

    /// Half-life of the trending category score, in days
    pub trending_half_life_days: f64,

    /// How far back past searches feed suggestions, in days
    pub suggestion_history_days: i64,

    /// Age after which search records are purged (0 disables the job)
    pub search_retention_days: i64,

    /// Price display locale
    pub price_locale: PriceLocale,

    /// Currency label appended to prices
    pub price_currency: String,

    /// Allowed CORS origin (none = same-origin only)
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let config = Self {
            database_url,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,
            run_migrations: parse_var("RUN_MIGRATIONS", "false")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", "3000")?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", "5000")?,
            mask_read_failures: parse_var("MASK_READ_FAILURES", "true")?,
            max_result_limit: parse_var("MAX_RESULT_LIMIT", "50")?,
            trending_window_days: parse_var("TRENDING_WINDOW_DAYS", "7")?,
            trending_half_life_days: parse_var("TRENDING_HALF_LIFE_DAYS", "3")?,
            suggestion_history_days: parse_var("SUGGESTION_HISTORY_DAYS", "30")?,
            search_retention_days: parse_var("SEARCH_RETENTION_DAYS", "90")?,
            price_locale: parse_var("PRICE_LOCALE", "fr")?,
            price_currency: env::var("PRICE_CURRENCY").unwrap_or_else(|_| "DA".to_string()),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok().filter(|v| !v.is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot turn into durations
    pub fn validate(&self) -> Result<(), ConfigError> {
        let day_range = 1..=MAX_DAYS;

        if !day_range.contains(&self.trending_window_days) {
            return Err(ConfigError::InvalidValue("TRENDING_WINDOW_DAYS"));
        }
        if !day_range.contains(&self.suggestion_history_days) {
            return Err(ConfigError::InvalidValue("SUGGESTION_HISTORY_DAYS"));
        }
        if self.search_retention_days != 0
            && !(self.trending_window_days..=MAX_DAYS).contains(&self.search_retention_days)
        {
            return Err(ConfigError::InvalidValue("SEARCH_RETENTION_DAYS"));
        }
        let half_life = self.trending_half_life_days;
        if !half_life.is_finite() || half_life <= 0.0 || half_life > MAX_DAYS as f64 {
            return Err(ConfigError::InvalidValue("TRENDING_HALF_LIFE_DAYS"));
        }
        if self.max_result_limit == 0 {
            return Err(ConfigError::InvalidValue("MAX_RESULT_LIMIT"));
        }
        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Runtime settings handed to the services
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            read_failures: if self.mask_read_failures {
                ReadFailurePolicy::Mask
            } else {
                ReadFailurePolicy::Surface
            },
            max_result_limit: self.max_result_limit,
            trending_window: chrono::Duration::days(self.trending_window_days),
            trending_weights: TrendingWeights {
                half_life_days: self.trending_half_life_days,
                ..TrendingWeights::default()
            },
            suggestion_history: chrono::Duration::days(self.suggestion_history_days),
            price_format: PriceFormat::new(self.price_locale, self.price_currency.clone()),
        }
    }

    /// Retention horizon for search records, if the purge job is enabled
    pub fn search_retention(&self) -> Option<chrono::Duration> {
        (self.search_retention_days > 0).then(|| chrono::Duration::days(self.search_retention_days))
    }
}

/// Read an env var (or its default) and parse it
fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

/// What read paths do when the store fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Log and answer with an empty result
    Mask,
    /// Propagate the error to the caller
    Surface,
}

/// Settings shared by every service
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub store_timeout: Duration,
    pub read_failures: ReadFailurePolicy,
    pub max_result_limit: usize,
    pub trending_window: chrono::Duration,
    pub trending_weights: TrendingWeights,
    pub suggestion_history: chrono::Duration,
    pub price_format: PriceFormat,
}

impl ServiceSettings {
    pub fn with_read_failures(mut self, policy: ReadFailurePolicy) -> Self {
        self.read_failures = policy;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn masks_read_failures(&self) -> bool {
        self.read_failures == ReadFailurePolicy::Mask
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            read_failures: ReadFailurePolicy::Mask,
            max_result_limit: 50,
            trending_window: chrono::Duration::days(7),
            trending_weights: TrendingWeights::default(),
            suggestion_history: chrono::Duration::days(30),
            price_format: PriceFormat::default(),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
