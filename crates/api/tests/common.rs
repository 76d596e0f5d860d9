#![allow(dead_code)]

use api::{create_router, AppState};
use axum_test::TestServer;
use services::activity::test_helpers::InMemoryActivityLogRepository;
use services::activity::ActivityLogServiceImpl;
use services::analytics::test_helpers::InMemoryMetricsRepository;
use services::analytics::AnalyticsFacade;
use services::metrics::MockMetricsService;
use std::sync::Arc;

/// Handles to the in-memory stores behind a test server, for seeding
/// rows and flipping failure modes mid-test.
pub struct TestContext {
    pub server: TestServer,
    pub metrics: Arc<InMemoryMetricsRepository>,
    pub activity: Arc<InMemoryActivityLogRepository>,
}

/// Create a test server with the full router over in-memory repositories
pub fn create_test_context() -> TestContext {
    let metrics = Arc::new(InMemoryMetricsRepository::default());
    let activity = Arc::new(InMemoryActivityLogRepository::default());

    let analytics_service = Arc::new(AnalyticsFacade::new(metrics.clone()));
    let activity_service = Arc::new(ActivityLogServiceImpl::new(activity.clone()));

    let app_state = AppState {
        analytics_service,
        activity_service,
        metrics_service: Arc::new(MockMetricsService),
    };

    let server = TestServer::new(create_router(app_state)).expect("Failed to create test server");

    TestContext {
        server,
        metrics,
        activity,
    }
}
