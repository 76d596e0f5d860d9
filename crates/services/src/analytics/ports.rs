//! Metrics repository trait and the row types shared by the report
//! calculators.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ContentId;

/// Order statuses that count toward revenue.
pub const PAID_ORDER_STATUSES: [&str; 2] = ["completed", "paid"];

/// Content catalogs sold through the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub enum ContentType {
    Book,
    Project,
    Game,
}

impl ContentType {
    pub const ALL: [ContentType; 3] =
        [ContentType::Book, ContentType::Project, ContentType::Game];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Book => "book",
            ContentType::Project => "project",
            ContentType::Game => "game",
        }
    }

    /// Catalog table holding this content type.
    pub fn table(&self) -> &'static str {
        match self {
            ContentType::Book => "books",
            ContentType::Project => "projects",
            ContentType::Game => "games",
        }
    }

    /// Display label used in revenue breakdowns.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Book => "Books",
            ContentType::Project => "Projects",
            ContentType::Game => "Games",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "book" => Some(ContentType::Book),
            "project" => Some(ContentType::Project),
            "game" => Some(ContentType::Game),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifetime totals across the whole store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TotalCounts {
    pub total_users: i64,
    pub total_revenue: f64,
    pub total_orders: i64,
    pub total_content: i64,
}

/// Totals restricted to rows created inside a reporting window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PeriodCounts {
    pub new_users: i64,
    pub revenue: f64,
    pub orders: i64,
    pub new_content: i64,
}

/// Best-selling item of one content type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TopSeller {
    pub content_id: ContentId,
    pub title: String,
    pub sales_count: i64,
    pub revenue: f64,
}

/// View counts for one tracked page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PagePopularity {
    pub page: String,
    pub total_views: i64,
    pub unique_views: i64,
}

/// Revenue collected on one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Session counts feeding the return-rate calculation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct VisitFrequency {
    pub total_sessions: i64,
    pub returning_sessions: i64,
}

/// Paid order count and revenue for a window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PeriodOrderTotals {
    pub order_count: i64,
    pub revenue: f64,
}

/// Revenue attributed to one content type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TypeRevenue {
    pub item_type: ContentType,
    pub revenue: f64,
}

/// Aggregated counts for one exact search query string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SearchTerm {
    pub query: String,
    pub search_count: i64,
    pub unique_users: i64,
    pub avg_results: f64,
    pub last_searched: DateTime<Utc>,
}

/// Search volume for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SearchDay {
    pub date: NaiveDate,
    pub searches: i64,
    pub unique_queries: i64,
    pub unique_users: i64,
}

/// One-pass totals over a search window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SearchTotals {
    pub total_searches: i64,
    pub unique_queries: i64,
    pub unique_users: i64,
    pub avg_results: f64,
    pub zero_result_searches: i64,
}

/// Category correlated with recent search queries by substring match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CategoryMatch {
    pub category: String,
    pub matches: i64,
}

/// Complete dashboard snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DashboardStats {
    pub total_users: i64,
    pub new_users_period: i64,
    pub total_revenue: f64,
    pub revenue_period: f64,
    pub total_orders: i64,
    pub orders_period: i64,
    pub total_content: i64,
    pub new_content_period: i64,
    pub top_books: Vec<TopSeller>,
    pub top_projects: Vec<TopSeller>,
    pub top_games: Vec<TopSeller>,
    pub popular_pages: Vec<PagePopularity>,
    pub daily_revenue: Vec<DailyRevenue>,
}

/// Visitor return-rate summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct EngagementMetrics {
    pub return_rate: String,
    pub total_sessions: i64,
    pub returning_sessions: i64,
}

impl Default for EngagementMetrics {
    fn default() -> Self {
        Self {
            return_rate: "0%".to_string(),
            total_sessions: 0,
            returning_sessions: 0,
        }
    }
}

/// Revenue breakdown row with a display label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct TypeRevenueBreakdown {
    pub item_type: String,
    pub revenue: f64,
}

/// Sales performance summary for a reporting window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SalesAnalytics {
    pub avg_order_value: Option<f64>,
    pub conversion_rate: f64,
    pub revenue_by_type: Vec<TypeRevenueBreakdown>,
}

/// Search behavior summary for a reporting window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SearchAnalytics {
    pub popular_terms: Vec<SearchTerm>,
    pub daily_trend: Vec<SearchDay>,
    pub zero_result_terms: Vec<SearchTerm>,
    pub aggregate_stats: SearchTotals,
    pub top_categories: Vec<CategoryMatch>,
}

/// Repository trait for the report aggregates
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Lifetime totals for the dashboard header
    async fn get_total_counts(&self) -> anyhow::Result<TotalCounts>;

    /// Totals for rows created at or after `start`
    async fn get_counts_since(&self, start: DateTime<Utc>) -> anyhow::Result<PeriodCounts>;

    /// Best sellers of one content type, ordered by units sold
    async fn get_top_sellers(
        &self,
        content_type: ContentType,
        limit: i64,
    ) -> anyhow::Result<Vec<TopSeller>>;

    /// Most viewed pages since `start`
    async fn get_page_views_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<PagePopularity>>;

    /// Paid revenue grouped by calendar day, oldest day first
    async fn get_daily_revenue_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyRevenue>>;

    /// Session totals for the return-rate metric
    async fn get_visit_frequency(&self) -> anyhow::Result<VisitFrequency>;

    /// Paid order count and revenue since `start`
    async fn get_order_totals_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<PeriodOrderTotals>;

    /// Distinct users with a paid order since `start`
    async fn get_distinct_buyers_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64>;

    /// Distinct sessions with a page view since `start`
    async fn get_distinct_visitors_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64>;

    /// Paid revenue grouped by item type since `start`
    async fn get_revenue_by_type_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TypeRevenue>>;

    /// Search terms grouped by exact query string, busiest first.
    /// `zero_results_only` restricts the grouping to searches that
    /// returned nothing.
    async fn get_search_terms_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
        zero_results_only: bool,
    ) -> anyhow::Result<Vec<SearchTerm>>;

    /// Daily search volume, most recent day first
    async fn get_search_trend_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<SearchDay>>;

    /// One-pass totals over the search window
    async fn get_search_totals_since(&self, start: DateTime<Utc>) -> anyhow::Result<SearchTotals>;

    /// Categories whose items match recent queries by substring
    async fn get_category_matches_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<CategoryMatch>>;

    /// Create the page-view and search-log tables if they are missing
    async fn ensure_tracking_tables(&self) -> anyhow::Result<()>;
}

/// Error types for report calculations
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalyticsError {
    #[error("metrics query failed: {0}")]
    QueryFailed(String),
}
