use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back-Office Analytics API",
        description = "Sales, engagement and search reporting for the digital goods store back office.",
        version = "1.0.0",
        license(name = "MIT",)
    ),
    paths(
        // Analytics endpoints
        crate::routes::analytics::get_dashboard,
        crate::routes::analytics::get_engagement,
        crate::routes::analytics::get_sales,
        crate::routes::analytics::get_search,
        // Activity log endpoints
        crate::routes::activity::list_activity,
    ),
    components(schemas(
        crate::routes::analytics::DashboardResponse,
        crate::routes::analytics::SalesResponse,
        crate::routes::analytics::SearchResponse,
        crate::routes::activity::ActivityEntryResponse,
        crate::routes::activity::ActivityListResponse,
        crate::error::ApiErrorResponse,
        services::analytics::DashboardStats,
        services::analytics::EngagementMetrics,
        services::analytics::SalesAnalytics,
        services::analytics::SearchAnalytics,
        services::analytics::TopSeller,
        services::analytics::PagePopularity,
        services::analytics::DailyRevenue,
        services::analytics::TypeRevenueBreakdown,
        services::analytics::SearchTerm,
        services::analytics::SearchDay,
        services::analytics::SearchTotals,
        services::analytics::CategoryMatch,
    )),
    tags(
        (name = "Analytics", description = "Dashboard, sales, engagement and search reports"),
        (name = "Activity", description = "Store activity log browsing")
    )
)]
pub struct ApiDoc;
