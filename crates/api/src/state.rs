use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub analytics_service: Arc<dyn services::analytics::AnalyticsService>,
    pub activity_service: Arc<dyn services::activity::ActivityLogService>,
    /// Metrics service for recording HTTP request metrics
    pub metrics_service: Arc<dyn services::metrics::MetricsServiceTrait>,
}
