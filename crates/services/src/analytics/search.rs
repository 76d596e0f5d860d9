//! Search behavior reports.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ports::{
    AnalyticsError, CategoryMatch, MetricsRepository, SearchDay, SearchTerm, SearchTotals,
};

/// Popular search terms listed per report.
pub const POPULAR_TERMS_LIMIT: i64 = 20;
/// Days covered by the search trend.
pub const DAILY_TREND_LIMIT: i64 = 30;
/// Zero-result terms listed per report.
pub const ZERO_RESULT_TERMS_LIMIT: i64 = 15;
/// Categories listed in the interest report.
pub const TOP_CATEGORIES_LIMIT: i64 = 10;

/// Reports on what store visitors search for.
pub struct SearchAnalyticsCalculator {
    repository: Arc<dyn MetricsRepository>,
}

impl SearchAnalyticsCalculator {
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self { repository }
    }

    /// Busiest exact query strings since `start`. Grouping is
    /// case-sensitive; "Python" and "python" are different terms.
    pub async fn popular_terms(
        &self,
        start: DateTime<Utc>,
    ) -> Result<Vec<SearchTerm>, AnalyticsError> {
        self.repository
            .get_search_terms_since(start, POPULAR_TERMS_LIMIT, false)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    /// Queries that returned nothing, grouped like `popular_terms`.
    pub async fn zero_result_terms(
        &self,
        start: DateTime<Utc>,
    ) -> Result<Vec<SearchTerm>, AnalyticsError> {
        self.repository
            .get_search_terms_since(start, ZERO_RESULT_TERMS_LIMIT, true)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    /// Daily search volume, newest day first. Days without searches are
    /// absent rather than zero-filled.
    pub async fn daily_trend(&self, start: DateTime<Utc>) -> Result<Vec<SearchDay>, AnalyticsError> {
        self.repository
            .get_search_trend_since(start, DAILY_TREND_LIMIT)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    /// Window-wide totals gathered in a single pass.
    pub async fn aggregate_stats(
        &self,
        start: DateTime<Utc>,
    ) -> Result<SearchTotals, AnalyticsError> {
        self.repository
            .get_search_totals_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }

    /// Categories whose items best match recent queries. Substring
    /// correlation, so one search may count toward several categories.
    pub async fn top_categories(
        &self,
        start: DateTime<Utc>,
    ) -> Result<Vec<CategoryMatch>, AnalyticsError> {
        self.repository
            .get_category_matches_since(start, TOP_CATEGORIES_LIMIT)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))
    }
}
