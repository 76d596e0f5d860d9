use api::{create_router_with_cors, ApiDoc, AppState};
use services::{
    activity::{ActivityLogService, ActivityLogServiceImpl},
    analytics::{AnalyticsFacade, AnalyticsService},
    metrics::{MetricsServiceTrait, MockMetricsService, OtlpMetricsService},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
        eprintln!("Continuing with environment variables...");
    }

    // Load configuration from environment
    let config = config::Config::from_env();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.directives().into());
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting back-office analytics server...");
    tracing::info!(
        "Database: {}:{}/{}",
        config.database.host,
        config.database.port,
        config.database.database
    );
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);

    // Connect to the database
    tracing::info!("Connecting to database...");
    let db = database::Database::from_config(&config.database).await?;

    // Get repositories
    let metrics_repo = db.metrics_repository();
    let activity_repo = db.activity_log_repository();

    // Create services
    tracing::info!("Initializing services...");
    let analytics_service = Arc::new(AnalyticsFacade::new(metrics_repo));
    let activity_service = Arc::new(ActivityLogServiceImpl::new(activity_repo));

    // Create the tracking tables on a fresh database
    analytics_service.initialize_tracking().await;

    // Set up OTLP metrics export when configured
    let meter_provider = api::telemetry::init_meter_provider(&config.telemetry)?;
    let metrics_service: Arc<dyn MetricsServiceTrait> = match &meter_provider {
        Some(provider) => {
            tracing::info!("OTLP metrics export enabled");
            Arc::new(OtlpMetricsService::new(provider))
        }
        None => {
            tracing::info!("OTLP metrics export disabled (TELEMETRY_OTLP_ENDPOINT not set)");
            Arc::new(MockMetricsService)
        }
    };

    // Create application state
    let app_state = AppState {
        analytics_service: analytics_service as Arc<dyn AnalyticsService>,
        activity_service: activity_service as Arc<dyn ActivityLogService>,
        metrics_service,
    };

    // Create router
    let app = create_router_with_cors(app_state, config.cors.clone())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
