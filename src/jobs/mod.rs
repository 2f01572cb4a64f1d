//! Scheduled Jobs
//!
//! Periodic maintenance for the search history table.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::domain::trending::instant_before;
use crate::store::{MarketplaceStore, StoreError};

// =========================================================================
// Search retention
// =========================================================================

/// Delete search records older than `retention`
pub async fn purge_expired_searches(
    store: &dyn MarketplaceStore,
    retention: chrono::Duration,
) -> Result<u64, JobError> {
    let cutoff = instant_before(Utc::now(), retention);
    let rows_deleted = store.purge_searches_before(cutoff).await?;

    if rows_deleted > 0 {
        tracing::info!(
            rows_deleted = rows_deleted,
            cutoff = %cutoff,
            "Purged expired search records"
        );
    }

    Ok(rows_deleted)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval between retention sweeps (default: 1 hour)
    pub purge_interval: Duration,
    /// Age after which search records are deleted; `None` disables the sweep
    pub search_retention: Option<chrono::Duration>,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            purge_interval: Duration::from_secs(3600),
            search_retention: Some(chrono::Duration::days(90)),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    store: Arc<dyn MarketplaceStore>,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    pub fn new(store: Arc<dyn MarketplaceStore>) -> Self {
        Self {
            store,
            config: JobSchedulerConfig::default(),
        }
    }

    pub fn with_config(store: Arc<dyn MarketplaceStore>, config: JobSchedulerConfig) -> Self {
        Self { store, config }
    }

    /// Start the job scheduler in the background.
    /// Returns a handle that can be used to abort the scheduler.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        let Some(retention) = self.config.search_retention else {
            tracing::info!("Search retention disabled, job scheduler idle");
            return;
        };

        tracing::info!(
            interval_secs = self.config.purge_interval.as_secs(),
            retention_days = retention.num_days(),
            "Job scheduler started"
        );

        let mut purge_interval = interval(self.config.purge_interval);
        loop {
            purge_interval.tick().await;
            if let Err(e) = purge_expired_searches(self.store.as_ref(), retention).await {
                tracing::error!(error = %e, "Search retention purge failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        if let Some(retention) = self.config.search_retention {
            match purge_expired_searches(self.store.as_ref(), retention).await {
                Ok(count) => report.searches_purged = count,
                Err(e) => report.errors.push(format!("Search purge: {}", e)),
            }
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub searches_purged: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
