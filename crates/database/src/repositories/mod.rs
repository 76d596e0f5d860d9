pub mod activity_log_repository;
pub mod metrics_repository;

pub use activity_log_repository::PostgresActivityLogRepository;
pub use metrics_repository::PostgresMetricsRepository;
