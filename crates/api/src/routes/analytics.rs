use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use services::analytics::{
    resolve_range_days, DashboardStats, EngagementMetrics, ReportingPeriod, SalesAnalytics,
    SearchAnalytics,
};

// --- Request/Response types ---

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PeriodQuery {
    /// Period token: 7_days, 30_days, 90_days or 1_year.
    /// Unknown tokens fall back to 30_days.
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "30_days".to_string()
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RangeQuery {
    /// Trailing window in days: 7, 30, 90 or 365. Anything else resolves to 30.
    pub range: Option<String>,
}

impl RangeQuery {
    /// Malformed values degrade to the default window instead of a 400.
    pub fn days(&self) -> i64 {
        self.range
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(30)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    /// Period token the stats were computed for, after fallback
    pub period: String,
    /// Human-readable period label
    pub period_label: String,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SalesResponse {
    /// Period token the summary was computed for, after fallback
    pub period: String,
    pub period_label: String,
    pub sales: SalesAnalytics,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    /// Resolved trailing window in days
    pub range_days: i64,
    pub search: SearchAnalytics,
}

// --- Handlers ---

/// Dashboard statistics for the back-office landing page
#[utoipa::path(
    get,
    path = "/v1/analytics/dashboard",
    tag = "Analytics",
    params(
        ("period" = Option<String>, Query, description = "Period token: 7_days, 30_days, 90_days or 1_year (default: 30_days)")
    ),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardResponse)
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    Query(params): Query<PeriodQuery>,
) -> Json<DashboardResponse> {
    tracing::debug!("Fetching dashboard stats: period={}", params.period);

    let period = ReportingPeriod::parse(&params.period);
    let stats = app_state
        .analytics_service
        .get_dashboard_stats(&params.period)
        .await;

    Json(DashboardResponse {
        period: period.token().to_string(),
        period_label: period.label().to_string(),
        stats,
    })
}

/// Visitor return-rate summary
#[utoipa::path(
    get,
    path = "/v1/analytics/engagement",
    tag = "Analytics",
    responses(
        (status = 200, description = "Engagement metrics", body = EngagementMetrics)
    )
)]
pub async fn get_engagement(State(app_state): State<AppState>) -> Json<EngagementMetrics> {
    Json(app_state.analytics_service.get_user_engagement().await)
}

/// Sales summary for a reporting period
#[utoipa::path(
    get,
    path = "/v1/analytics/sales",
    tag = "Analytics",
    params(
        ("period" = Option<String>, Query, description = "Period token: 7_days, 30_days, 90_days or 1_year (default: 30_days)")
    ),
    responses(
        (status = 200, description = "Sales analytics", body = SalesResponse)
    )
)]
pub async fn get_sales(
    State(app_state): State<AppState>,
    Query(params): Query<PeriodQuery>,
) -> Json<SalesResponse> {
    let period = ReportingPeriod::parse(&params.period);
    let sales = app_state
        .analytics_service
        .get_sales_analytics(&params.period)
        .await;

    Json(SalesResponse {
        period: period.token().to_string(),
        period_label: period.label().to_string(),
        sales,
    })
}

/// Search behavior reports over a trailing day window
#[utoipa::path(
    get,
    path = "/v1/analytics/search",
    tag = "Analytics",
    params(
        ("range" = Option<String>, Query, description = "Trailing window in days: 7, 30, 90 or 365 (default: 30)")
    ),
    responses(
        (status = 200, description = "Search analytics", body = SearchResponse)
    )
)]
pub async fn get_search(
    State(app_state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Json<SearchResponse> {
    let range_days = resolve_range_days(params.days());
    tracing::debug!("Fetching search analytics: range_days={}", range_days);

    let search = app_state
        .analytics_service
        .get_search_analytics(range_days)
        .await;

    Json(SearchResponse { range_days, search })
}

/// Create analytics routes router
pub fn create_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/engagement", get(get_engagement))
        .route("/sales", get(get_sales))
        .route("/search", get(get_search))
}
