use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;
use tracing::debug;

pub type DbPool = Pool;

/// Build a connection pool from the database configuration.
pub fn create_pool(config: &config::DatabaseConfig) -> anyhow::Result<Pool> {
    debug!(
        "Creating database pool for {}:{}/{}",
        config.host, config.port, config.database
    );

    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.database.clone());
    cfg.user = Some(config.username.clone());
    cfg.password = Some(config.password.clone());
    cfg.pool = Some(PoolConfig::new(config.max_connections as usize));

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))
}
