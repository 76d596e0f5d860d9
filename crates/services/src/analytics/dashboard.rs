//! Dashboard report assembly.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::period::day_window_start;
use super::ports::{
    AnalyticsError, ContentType, DailyRevenue, MetricsRepository, PagePopularity, PeriodCounts,
    TopSeller, TotalCounts,
};

/// Best sellers shown per content type.
pub const TOP_SELLERS_LIMIT: i64 = 5;
/// Trailing window for the popular-pages panel, in days.
pub const POPULAR_PAGES_WINDOW_DAYS: i64 = 7;
/// Pages shown in the popular-pages panel.
pub const POPULAR_PAGES_LIMIT: i64 = 10;
/// Calendar days covered by the revenue chart.
pub const DAILY_REVENUE_WINDOW_DAYS: i64 = 7;

/// Builds the dashboard panels from repository aggregates.
pub struct DashboardStatsCalculator {
    repository: Arc<dyn MetricsRepository>,
}

impl DashboardStatsCalculator {
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self { repository }
    }

    pub async fn total_counts(&self) -> Result<TotalCounts, AnalyticsError> {
        self.repository
            .get_total_counts()
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    pub async fn period_deltas(
        &self,
        start: DateTime<Utc>,
    ) -> Result<PeriodCounts, AnalyticsError> {
        self.repository
            .get_counts_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    pub async fn top_sellers(
        &self,
        content_type: ContentType,
        limit: i64,
    ) -> Result<Vec<TopSeller>, AnalyticsError> {
        self.repository
            .get_top_sellers(content_type, limit)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    pub async fn popular_pages(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PagePopularity>, AnalyticsError> {
        let start = now - Duration::days(POPULAR_PAGES_WINDOW_DAYS);
        self.repository
            .get_page_views_since(start, POPULAR_PAGES_LIMIT)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    /// Revenue per calendar day over the chart window.
    ///
    /// Days without a paid order are filled with zero so the chart always
    /// covers the full window, oldest day first.
    pub async fn daily_revenue(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyRevenue>, AnalyticsError> {
        let start = day_window_start(now, DAILY_REVENUE_WINDOW_DAYS);
        let rows = self
            .repository
            .get_daily_revenue_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;

        let by_date: HashMap<_, _> = rows.into_iter().map(|r| (r.date, r.revenue)).collect();
        let first_day = start.date_naive();
        let filled = (0..DAILY_REVENUE_WINDOW_DAYS)
            .map(|offset| {
                let date = first_day + Duration::days(offset);
                DailyRevenue {
                    date,
                    revenue: by_date.get(&date).copied().unwrap_or(0.0),
                }
            })
            .collect();
        Ok(filled)
    }
}
