pub mod metrics;

pub use metrics::{http_metrics_middleware, MetricsState};
