//! Visitor engagement metrics.

use std::sync::Arc;

use super::ports::{AnalyticsError, EngagementMetrics, MetricsRepository};

/// Computes the visitor return rate from tracked session history.
pub struct EngagementCalculator {
    repository: Arc<dyn MetricsRepository>,
}

impl EngagementCalculator {
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self { repository }
    }

    /// Share of sessions that came back for more than one page view,
    /// formatted for display. Zero sessions reports exactly `"0%"`.
    pub async fn user_engagement(&self) -> Result<EngagementMetrics, AnalyticsError> {
        let frequency = self
            .repository
            .get_visit_frequency()
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;

        if frequency.total_sessions == 0 {
            return Ok(EngagementMetrics::default());
        }

        let rate =
            frequency.returning_sessions as f64 * 100.0 / frequency.total_sessions as f64;
        Ok(EngagementMetrics {
            return_rate: format!("{rate:.1}%"),
            total_sessions: frequency.total_sessions,
            returning_sessions: frequency.returning_sessions,
        })
    }
}
