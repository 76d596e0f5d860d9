//! Sales performance metrics.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::ports::{AnalyticsError, MetricsRepository, SalesAnalytics, TypeRevenueBreakdown};

/// Round money and percentage values to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes order-value, conversion and per-type revenue for a window.
pub struct SalesAnalyticsCalculator {
    repository: Arc<dyn MetricsRepository>,
}

impl SalesAnalyticsCalculator {
    pub fn new(repository: Arc<dyn MetricsRepository>) -> Self {
        Self { repository }
    }

    /// Sales summary since `start`.
    ///
    /// `avg_order_value` is `None` when the window has no paid orders so
    /// callers can render "N/A" instead of a misleading zero. Content
    /// types without sales are omitted from `revenue_by_type`.
    pub async fn sales_analytics(
        &self,
        start: DateTime<Utc>,
    ) -> Result<SalesAnalytics, AnalyticsError> {
        let totals = self
            .repository
            .get_order_totals_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;
        let buyers = self
            .repository
            .get_distinct_buyers_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;
        let visitors = self
            .repository
            .get_distinct_visitors_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;
        let by_type = self
            .repository
            .get_revenue_by_type_since(start)
            .await
            .map_err(|e| AnalyticsError::QueryFailed(e.to_string()))?;

        let avg_order_value =
            (totals.order_count > 0).then(|| round2(totals.revenue / totals.order_count as f64));

        let conversion_rate = if visitors == 0 {
            0.0
        } else {
            // Buyers can exceed tracked visitors when purchases arrive
            // from untracked sessions, so clamp to 100.
            round2(buyers as f64 * 100.0 / visitors as f64).min(100.0)
        };

        let revenue_by_type = by_type
            .into_iter()
            .map(|row| TypeRevenueBreakdown {
                item_type: row.item_type.label().to_string(),
                revenue: round2(row.revenue),
            })
            .collect();

        Ok(SalesAnalytics {
            avg_order_value,
            conversion_rate,
            revenue_by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_helpers::{
        ContentRecord, InMemoryMetricsRepository, OrderItemRecord, OrderRecord, PageViewRecord,
    };
    use crate::analytics::ContentType;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn paid_order(id: i64, user_id: i64, amount: f64, days_ago: i64) -> OrderRecord {
        OrderRecord {
            id,
            user_id,
            total_amount: amount,
            status: "completed".to_string(),
            created_at: fixed_now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(49.996), 50.0);
        assert_eq!(round2(33.333), 33.33);
        assert_eq!(round2(0.005), 0.01);
    }

    #[tokio::test]
    async fn test_zero_orders_yields_null_average() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let calc = SalesAnalyticsCalculator::new(repository);

        let sales = calc
            .sales_analytics(fixed_now() - Duration::days(30))
            .await
            .unwrap();

        assert_eq!(sales.avg_order_value, None);
        assert_eq!(sales.conversion_rate, 0.0);
        assert!(sales.revenue_by_type.is_empty());
    }

    #[tokio::test]
    async fn test_three_orders_two_types() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let now = fixed_now();
        // $150 across three paid orders; ten items spanning two books
        // and one project.
        repository.add_order(paid_order(1, 1, 40.0, 1));
        repository.add_order(paid_order(2, 2, 60.0, 2));
        repository.add_order(paid_order(3, 3, 50.0, 3));
        for (id, content_type) in [
            (1, ContentType::Book),
            (2, ContentType::Book),
            (3, ContentType::Project),
        ] {
            repository.add_content(ContentRecord {
                id,
                content_type,
                title: format!("Item {id}"),
                author: None,
                category: "General".to_string(),
                is_active: true,
                created_at: now - Duration::days(90),
            });
        }
        repository.add_order_item(OrderItemRecord {
            order_id: 1,
            content_id: 1,
            item_type: ContentType::Book,
            unit_price: 10.0,
            quantity: 4,
        });
        repository.add_order_item(OrderItemRecord {
            order_id: 2,
            content_id: 2,
            item_type: ContentType::Book,
            unit_price: 12.0,
            quantity: 5,
        });
        repository.add_order_item(OrderItemRecord {
            order_id: 3,
            content_id: 3,
            item_type: ContentType::Project,
            unit_price: 50.0,
            quantity: 1,
        });

        let calc = SalesAnalyticsCalculator::new(repository);
        let sales = calc.sales_analytics(now - Duration::days(30)).await.unwrap();

        assert_eq!(sales.avg_order_value, Some(50.0));
        // Exactly two rows: no zero-filled entry for games.
        assert_eq!(sales.revenue_by_type.len(), 2);
        let books = sales
            .revenue_by_type
            .iter()
            .find(|r| r.item_type == "Books")
            .unwrap();
        assert_eq!(books.revenue, 100.0);
        let projects = sales
            .revenue_by_type
            .iter()
            .find(|r| r.item_type == "Projects")
            .unwrap();
        assert_eq!(projects.revenue, 50.0);
        assert!(!sales.revenue_by_type.iter().any(|r| r.item_type == "Games"));
    }

    #[tokio::test]
    async fn test_conversion_rate_counts_distinct_buyers_and_visitors() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let now = fixed_now();
        // Four tracked sessions, one distinct buyer.
        for session in ["s1", "s2", "s3", "s4"] {
            repository.add_page_view(PageViewRecord {
                page: "/books".to_string(),
                session_id: session.to_string(),
                user_id: None,
                viewed_at: now - Duration::days(2),
            });
        }
        repository.add_order(paid_order(1, 7, 10.0, 1));
        repository.add_order(paid_order(2, 7, 10.0, 2));

        let calc = SalesAnalyticsCalculator::new(repository);
        let sales = calc.sales_analytics(now - Duration::days(30)).await.unwrap();

        assert_eq!(sales.conversion_rate, 25.0);
    }

    #[tokio::test]
    async fn test_conversion_rate_clamped_to_hundred() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let now = fixed_now();
        // One tracked session but three distinct buyers.
        repository.add_page_view(PageViewRecord {
            page: "/".to_string(),
            session_id: "s1".to_string(),
            user_id: None,
            viewed_at: now - Duration::days(1),
        });
        repository.add_order(paid_order(1, 1, 10.0, 1));
        repository.add_order(paid_order(2, 2, 10.0, 1));
        repository.add_order(paid_order(3, 3, 10.0, 1));

        let calc = SalesAnalyticsCalculator::new(repository);
        let sales = calc.sales_analytics(now - Duration::days(30)).await.unwrap();

        assert_eq!(sales.conversion_rate, 100.0);
    }

    #[tokio::test]
    async fn test_unpaid_orders_excluded_from_average() {
        let repository = Arc::new(InMemoryMetricsRepository::default());
        let now = fixed_now();
        repository.add_order(paid_order(1, 1, 30.0, 1));
        repository.add_order(OrderRecord {
            id: 2,
            user_id: 2,
            total_amount: 500.0,
            status: "cancelled".to_string(),
            created_at: now - Duration::days(1),
        });

        let calc = SalesAnalyticsCalculator::new(repository);
        let sales = calc.sales_analytics(now - Duration::days(30)).await.unwrap();

        assert_eq!(sales.avg_order_value, Some(30.0));
    }
}
