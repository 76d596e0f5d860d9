pub mod pool;
pub mod repositories;

pub use pool::{create_pool, DbPool};
pub use repositories::{PostgresActivityLogRepository, PostgresMetricsRepository};

use anyhow::Result;
use std::sync::Arc;

/// Database service combining all repositories
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a new database service from a connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new database service from configuration
    pub async fn from_config(config: &config::DatabaseConfig) -> Result<Self> {
        let pool = create_pool(config)?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn metrics_repository(&self) -> Arc<PostgresMetricsRepository> {
        Arc::new(PostgresMetricsRepository::new(self.pool.clone()))
    }

    pub fn activity_log_repository(&self) -> Arc<PostgresActivityLogRepository> {
        Arc::new(PostgresActivityLogRepository::new(self.pool.clone()))
    }
}
