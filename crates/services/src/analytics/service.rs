//! Report facade behind the analytics endpoints.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::dashboard::{DashboardStatsCalculator, TOP_SELLERS_LIMIT};
use super::engagement::EngagementCalculator;
use super::period::{day_window_start, resolve_range_days, ReportingPeriod};
use super::ports::{
    AnalyticsError, ContentType, DashboardStats, EngagementMetrics, MetricsRepository,
    SalesAnalytics, SearchAnalytics,
};
use super::sales::SalesAnalyticsCalculator;
use super::search::SearchAnalyticsCalculator;

/// Facade over the report calculators.
///
/// Getters are infallible: a failed aggregate degrades to its zero value
/// and the failure is logged, so one bad query never blanks a whole page.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Dashboard snapshot for a period token ("7_days", "30_days",
    /// "90_days", "1_year"; anything else falls back to 30 days).
    async fn get_dashboard_stats(&self, period: &str) -> DashboardStats;

    /// Visitor return-rate summary over all tracked sessions.
    async fn get_user_engagement(&self) -> EngagementMetrics;

    /// Sales summary for a period token.
    async fn get_sales_analytics(&self, period: &str) -> SalesAnalytics;

    /// Search reports over the trailing `range_days` calendar days.
    /// Day counts outside the supported menu resolve to 30.
    async fn get_search_analytics(&self, range_days: i64) -> SearchAnalytics;

    /// Create the tracking tables if missing. Idempotent, safe to call
    /// on every startup.
    async fn initialize_tracking(&self);
}

pub struct AnalyticsFacade {
    repository: Arc<dyn MetricsRepository>,
    dashboard: DashboardStatsCalculator,
    engagement: EngagementCalculator,
    sales: SalesAnalyticsCalculator,
    search: SearchAnalyticsCalculator,
}

impl AnalyticsFacade {
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self {
            dashboard: DashboardStatsCalculator::new(repository.clone()),
            engagement: EngagementCalculator::new(repository.clone()),
            sales: SalesAnalyticsCalculator::new(repository.clone()),
            search: SearchAnalyticsCalculator::new(repository.clone()),
            repository,
        }
    }
}

/// Log a failed aggregate and fall back to its zero value.
fn or_default<T: Default>(metric: &'static str, result: Result<T, AnalyticsError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(metric, error = %err, "analytics query failed, serving zero values");
            T::default()
        }
    }
}

#[async_trait]
impl AnalyticsService for AnalyticsFacade {
    async fn get_dashboard_stats(&self, period: &str) -> DashboardStats {
        let now = Utc::now();
        let start = ReportingPeriod::parse(period).start(now);

        let totals = or_default("dashboard.total_counts", self.dashboard.total_counts().await);
        let deltas = or_default(
            "dashboard.period_deltas",
            self.dashboard.period_deltas(start).await,
        );
        let top_books = or_default(
            "dashboard.top_books",
            self.dashboard
                .top_sellers(ContentType::Book, TOP_SELLERS_LIMIT)
                .await,
        );
        let top_projects = or_default(
            "dashboard.top_projects",
            self.dashboard
                .top_sellers(ContentType::Project, TOP_SELLERS_LIMIT)
                .await,
        );
        let top_games = or_default(
            "dashboard.top_games",
            self.dashboard
                .top_sellers(ContentType::Game, TOP_SELLERS_LIMIT)
                .await,
        );
        let popular_pages = or_default(
            "dashboard.popular_pages",
            self.dashboard.popular_pages(now).await,
        );
        let daily_revenue = or_default(
            "dashboard.daily_revenue",
            self.dashboard.daily_revenue(now).await,
        );

        DashboardStats {
            total_users: totals.total_users,
            new_users_period: deltas.new_users,
            total_revenue: totals.total_revenue,
            revenue_period: deltas.revenue,
            total_orders: totals.total_orders,
            orders_period: deltas.orders,
            total_content: totals.total_content,
            new_content_period: deltas.new_content,
            top_books,
            top_projects,
            top_games,
            popular_pages,
            daily_revenue,
        }
    }

    async fn get_user_engagement(&self) -> EngagementMetrics {
        or_default(
            "engagement.return_rate",
            self.engagement.user_engagement().await,
        )
    }

    async fn get_sales_analytics(&self, period: &str) -> SalesAnalytics {
        let start = ReportingPeriod::parse(period).start(Utc::now());
        or_default("sales.summary", self.sales.sales_analytics(start).await)
    }

    async fn get_search_analytics(&self, range_days: i64) -> SearchAnalytics {
        let days = resolve_range_days(range_days);
        let start = day_window_start(Utc::now(), days);

        SearchAnalytics {
            popular_terms: or_default(
                "search.popular_terms",
                self.search.popular_terms(start).await,
            ),
            daily_trend: or_default("search.daily_trend", self.search.daily_trend(start).await),
            zero_result_terms: or_default(
                "search.zero_result_terms",
                self.search.zero_result_terms(start).await,
            ),
            aggregate_stats: or_default(
                "search.aggregate_stats",
                self.search.aggregate_stats(start).await,
            ),
            top_categories: or_default(
                "search.top_categories",
                self.search.top_categories(start).await,
            ),
        }
    }

    async fn initialize_tracking(&self) {
        if let Err(err) = self.repository.ensure_tracking_tables().await {
            tracing::error!(error = %err, "failed to initialize tracking tables");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::dashboard::DAILY_REVENUE_WINDOW_DAYS;
    use crate::analytics::test_helpers::{
        ContentRecord, InMemoryMetricsRepository, OrderRecord, SearchLogRecord, UserRecord,
    };
    use chrono::Duration;

    fn facade(repository: Arc<InMemoryMetricsRepository>) -> AnalyticsFacade {
        AnalyticsFacade::new(repository)
    }

    #[tokio::test]
    async fn test_unknown_period_token_serves_default_window() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let service = facade(repository);

        // Must not panic or error, just fall back to the 30-day window.
        let stats = service.get_dashboard_stats("banana").await;

        assert_eq!(stats.total_users, 0);
        assert_eq!(
            stats.daily_revenue.len(),
            DAILY_REVENUE_WINDOW_DAYS as usize
        );
    }

    #[tokio::test]
    async fn test_period_deltas_bounded_by_totals_for_every_token() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let now = Utc::now();
        repository.add_user(UserRecord {
            id: 1,
            created_at: now - Duration::days(3),
        });
        repository.add_user(UserRecord {
            id: 2,
            created_at: now - Duration::days(400),
        });
        repository.add_order(OrderRecord {
            id: 1,
            user_id: 1,
            total_amount: 40.0,
            status: "completed".to_string(),
            created_at: now - Duration::days(5),
        });
        repository.add_order(OrderRecord {
            id: 2,
            user_id: 2,
            total_amount: 10.0,
            status: "completed".to_string(),
            created_at: now - Duration::days(200),
        });
        repository.add_content(ContentRecord {
            id: 1,
            content_type: ContentType::Book,
            title: "Ledger".to_string(),
            author: None,
            category: "Business".to_string(),
            is_active: true,
            created_at: now - Duration::days(100),
        });
        let service = facade(repository);

        for token in ["7_days", "30_days", "90_days", "1_year"] {
            let stats = service.get_dashboard_stats(token).await;

            assert!(stats.new_users_period >= 0, "negative users for {token}");
            assert!(stats.orders_period >= 0, "negative orders for {token}");
            assert!(stats.revenue_period >= 0.0, "negative revenue for {token}");
            assert!(
                stats.new_users_period <= stats.total_users,
                "user delta exceeds total for {token}"
            );
            assert!(
                stats.orders_period <= stats.total_orders,
                "order delta exceeds total for {token}"
            );
            assert!(
                stats.revenue_period <= stats.total_revenue,
                "revenue delta exceeds total for {token}"
            );
            assert!(
                stats.new_content_period <= stats.total_content,
                "content delta exceeds total for {token}"
            );
        }

        // Windows actually widen: the 200-day-old order only shows up
        // in the 1-year delta.
        assert_eq!(service.get_dashboard_stats("7_days").await.orders_period, 1);
        assert_eq!(service.get_dashboard_stats("1_year").await.orders_period, 2);
    }

    #[tokio::test]
    async fn test_dashboard_degrades_per_panel_on_failure() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        repository.set_failing(true);
        let service = facade(repository);

        let stats = service.get_dashboard_stats("7_days").await;

        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_revenue, 0.0);
        assert!(stats.top_books.is_empty());
        assert!(stats.popular_pages.is_empty());
        assert!(stats.daily_revenue.is_empty());
    }

    #[tokio::test]
    async fn test_engagement_degrades_to_zero_percent() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        repository.set_failing(true);
        let service = facade(repository);

        let metrics = service.get_user_engagement().await;

        assert_eq!(metrics.return_rate, "0%");
        assert_eq!(metrics.total_sessions, 0);
    }

    #[tokio::test]
    async fn test_sales_degrade_to_null_average() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        repository.set_failing(true);
        let service = facade(repository);

        let sales = service.get_sales_analytics("30_days").await;

        assert_eq!(sales.avg_order_value, None);
        assert_eq!(sales.conversion_rate, 0.0);
        assert!(sales.revenue_by_type.is_empty());
    }

    #[tokio::test]
    async fn test_search_degrades_field_by_field() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        repository.set_failing(true);
        let service = facade(repository);

        let search = service.get_search_analytics(30).await;

        assert!(search.popular_terms.is_empty());
        assert!(search.daily_trend.is_empty());
        assert!(search.zero_result_terms.is_empty());
        assert!(search.top_categories.is_empty());
        assert_eq!(search.aggregate_stats.total_searches, 0);
    }

    #[tokio::test]
    async fn test_search_range_outside_menu_falls_back_to_thirty_days() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        // Inside the 30-day fallback window but outside a 7-day one.
        repository.add_search_log(SearchLogRecord {
            query: "rust".to_string(),
            result_count: 4,
            user_id: Some(1),
            search_type: "search".to_string(),
            searched_at: Utc::now() - Duration::days(20),
        });
        let service = facade(repository);

        let search = service.get_search_analytics(12345).await;

        assert_eq!(search.aggregate_stats.total_searches, 1);
        assert_eq!(search.popular_terms.len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_tracking_is_idempotent_and_swallows_failure() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let service = facade(repository.clone());

        service.initialize_tracking().await;
        service.initialize_tracking().await;
        assert!(repository.tracking_initialized());

        repository.set_failing(true);
        // Must not panic even when the store is down.
        service.initialize_tracking().await;
    }
}
