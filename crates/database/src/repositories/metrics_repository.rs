use crate::pool::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use services::analytics::{
    CategoryMatch, ContentType, DailyRevenue, MetricsRepository, PagePopularity, PeriodCounts,
    PeriodOrderTotals, SearchDay, SearchTerm, SearchTotals, TopSeller, TotalCounts, TypeRevenue,
    VisitFrequency, PAID_ORDER_STATUSES,
};

/// Statement timeout for the report aggregation queries (10 seconds).
const REPORT_QUERY_TIMEOUT_MS: u32 = 10_000;

/// Hard cap for ranked listings regardless of the caller's limit.
const MAX_REPORT_ROWS: i64 = 100;

/// Bootstrap DDL for the tracking tables. The storefront schema (users,
/// orders, catalog tables) is owned by the store itself; only the
/// page-view and search-log tables belong to this service.
const TRACKING_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS page_views (
    id BIGSERIAL PRIMARY KEY,
    page TEXT NOT NULL,
    session_id TEXT NOT NULL,
    user_id BIGINT,
    viewed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_page_views_viewed_at ON page_views (viewed_at);
CREATE INDEX IF NOT EXISTS idx_page_views_session ON page_views (session_id);

CREATE TABLE IF NOT EXISTS search_logs (
    id BIGSERIAL PRIMARY KEY,
    query TEXT NOT NULL,
    result_count BIGINT NOT NULL DEFAULT 0,
    user_id BIGINT,
    search_type TEXT NOT NULL DEFAULT 'search',
    searched_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_search_logs_searched_at ON search_logs (searched_at);
";

pub struct PostgresMetricsRepository {
    pool: DbPool,
}

impl PostgresMetricsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run one aggregation query inside a transaction so the SET LOCAL
    /// statement timeout takes effect.
    async fn query_with_timeout(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> anyhow::Result<Vec<tokio_postgres::Row>> {
        let mut client = self.pool.get().await?;
        let tx = client.build_transaction().start().await?;
        tx.execute(
            &format!("SET LOCAL statement_timeout = '{REPORT_QUERY_TIMEOUT_MS}'"),
            &[],
        )
        .await?;
        let rows = tx.query(sql, params).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn query_one_with_timeout(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> anyhow::Result<tokio_postgres::Row> {
        let rows = self.query_with_timeout(sql, params).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("aggregate query returned no rows"))
    }
}

/// SQL literal list of the order statuses that count as revenue.
fn paid_status_list() -> String {
    PAID_ORDER_STATUSES
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One arm of the category match query. A query and a title match when
/// either lowercased string contains the other; book rows also match on
/// the author name.
fn category_match_subquery(table: &str, with_author: bool) -> String {
    let author_clause = if with_author {
        "
               OR (c.author IS NOT NULL
                   AND (LOWER(c.author) LIKE '%' || LOWER(sl.query) || '%'
                        OR LOWER(sl.query) LIKE '%' || LOWER(c.author) || '%'))"
    } else {
        ""
    };
    format!(
        "SELECT cat.name AS category, COUNT(*) AS matches
         FROM search_logs sl
         JOIN {table} c
           ON LOWER(c.title) LIKE '%' || LOWER(sl.query) || '%'
               OR LOWER(sl.query) LIKE '%' || LOWER(c.title) || '%'{author_clause}
         JOIN categories cat ON cat.id = c.category_id
         WHERE sl.search_type = 'search' AND sl.query <> '' AND sl.searched_at >= $1
         GROUP BY cat.name"
    )
}

#[async_trait]
impl MetricsRepository for PostgresMetricsRepository {
    async fn get_total_counts(&self) -> anyhow::Result<TotalCounts> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COALESCE(SUM(total_amount), 0)::FLOAT8
                   FROM orders WHERE status IN ({paid})),
                (SELECT COUNT(*) FROM orders),
                (SELECT COUNT(*) FROM books WHERE is_active)
                    + (SELECT COUNT(*) FROM projects WHERE is_active)
                    + (SELECT COUNT(*) FROM games WHERE is_active)"
        );
        let row = self.query_one_with_timeout(&sql, &[]).await?;

        Ok(TotalCounts {
            total_users: row.get(0),
            total_revenue: row.get(1),
            total_orders: row.get(2),
            total_content: row.get(3),
        })
    }

    async fn get_counts_since(&self, start: DateTime<Utc>) -> anyhow::Result<PeriodCounts> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE created_at >= $1),
                (SELECT COALESCE(SUM(total_amount), 0)::FLOAT8
                   FROM orders WHERE status IN ({paid}) AND created_at >= $1),
                (SELECT COUNT(*) FROM orders WHERE created_at >= $1),
                (SELECT COUNT(*) FROM books WHERE is_active AND created_at >= $1)
                    + (SELECT COUNT(*) FROM projects WHERE is_active AND created_at >= $1)
                    + (SELECT COUNT(*) FROM games WHERE is_active AND created_at >= $1)"
        );
        let row = self.query_one_with_timeout(&sql, &[&start]).await?;

        Ok(PeriodCounts {
            new_users: row.get(0),
            revenue: row.get(1),
            orders: row.get(2),
            new_content: row.get(3),
        })
    }

    async fn get_top_sellers(
        &self,
        content_type: ContentType,
        limit: i64,
    ) -> anyhow::Result<Vec<TopSeller>> {
        let paid = paid_status_list();
        let table = content_type.table();
        let capped_limit = limit.min(MAX_REPORT_ROWS);

        // Items whose content row was deleted from the catalog drop out
        // of the join rather than surfacing with an empty title.
        let sql = format!(
            "SELECT c.id, c.title,
                    COALESCE(SUM(oi.quantity), 0)::BIGINT AS sales_count,
                    COALESCE(SUM(oi.unit_price * oi.quantity), 0)::FLOAT8 AS revenue
             FROM {table} c
             JOIN order_items oi ON oi.content_id = c.id AND oi.item_type = $1
             JOIN orders o ON o.id = oi.order_id
             WHERE o.status IN ({paid})
             GROUP BY c.id, c.title
             ORDER BY sales_count DESC, c.id ASC
             LIMIT $2"
        );
        let rows = self
            .query_with_timeout(&sql, &[&content_type.as_str(), &capped_limit])
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopSeller {
                content_id: r.get(0),
                title: r.get(1),
                sales_count: r.get(2),
                revenue: r.get(3),
            })
            .collect())
    }

    async fn get_page_views_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<PagePopularity>> {
        let capped_limit = limit.min(MAX_REPORT_ROWS);
        let rows = self
            .query_with_timeout(
                "SELECT page,
                        COUNT(*) AS total_views,
                        COUNT(DISTINCT session_id) AS unique_views
                 FROM page_views
                 WHERE viewed_at >= $1
                 GROUP BY page
                 ORDER BY total_views DESC, page ASC
                 LIMIT $2",
                &[&start, &capped_limit],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| PagePopularity {
                page: r.get(0),
                total_views: r.get(1),
                unique_views: r.get(2),
            })
            .collect())
    }

    async fn get_daily_revenue_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyRevenue>> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT DATE(created_at) AS day,
                    COALESCE(SUM(total_amount), 0)::FLOAT8 AS revenue
             FROM orders
             WHERE status IN ({paid}) AND created_at >= $1
             GROUP BY day
             ORDER BY day ASC"
        );
        let rows = self.query_with_timeout(&sql, &[&start]).await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyRevenue {
                date: r.get(0),
                revenue: r.get(1),
            })
            .collect())
    }

    async fn get_visit_frequency(&self) -> anyhow::Result<VisitFrequency> {
        let row = self
            .query_one_with_timeout(
                "SELECT COUNT(*),
                        COUNT(*) FILTER (WHERE visit_count > 1)
                 FROM (
                     SELECT session_id, COUNT(*) AS visit_count
                     FROM page_views
                     GROUP BY session_id
                 ) sessions",
                &[],
            )
            .await?;

        Ok(VisitFrequency {
            total_sessions: row.get(0),
            returning_sessions: row.get(1),
        })
    }

    async fn get_order_totals_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<PeriodOrderTotals> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(total_amount), 0)::FLOAT8
             FROM orders
             WHERE status IN ({paid}) AND created_at >= $1"
        );
        let row = self.query_one_with_timeout(&sql, &[&start]).await?;

        Ok(PeriodOrderTotals {
            order_count: row.get(0),
            revenue: row.get(1),
        })
    }

    async fn get_distinct_buyers_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT COUNT(DISTINCT user_id)
             FROM orders
             WHERE status IN ({paid}) AND created_at >= $1"
        );
        let row = self.query_one_with_timeout(&sql, &[&start]).await?;
        Ok(row.get(0))
    }

    async fn get_distinct_visitors_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64> {
        let row = self
            .query_one_with_timeout(
                "SELECT COUNT(DISTINCT session_id)
                 FROM page_views
                 WHERE viewed_at >= $1",
                &[&start],
            )
            .await?;
        Ok(row.get(0))
    }

    async fn get_revenue_by_type_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TypeRevenue>> {
        let paid = paid_status_list();
        let sql = format!(
            "SELECT oi.item_type,
                    COALESCE(SUM(oi.unit_price * oi.quantity), 0)::FLOAT8 AS revenue
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE o.status IN ({paid}) AND o.created_at >= $1
             GROUP BY oi.item_type"
        );
        let rows = self.query_with_timeout(&sql, &[&start]).await?;

        let mut breakdown: Vec<TypeRevenue> = rows
            .into_iter()
            .filter_map(|r| {
                let raw: String = r.get(0);
                match ContentType::from_str(&raw) {
                    Some(item_type) => Some(TypeRevenue {
                        item_type,
                        revenue: r.get(1),
                    }),
                    None => {
                        tracing::warn!("Skipping revenue row with unknown item type: {}", raw);
                        None
                    }
                }
            })
            .collect();
        // Catalog order: books, projects, games.
        breakdown.sort_by_key(|row| ContentType::ALL.iter().position(|t| *t == row.item_type));
        Ok(breakdown)
    }

    async fn get_search_terms_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
        zero_results_only: bool,
    ) -> anyhow::Result<Vec<SearchTerm>> {
        let zero_filter = if zero_results_only {
            " AND result_count = 0"
        } else {
            ""
        };
        let capped_limit = limit.min(MAX_REPORT_ROWS);
        let sql = format!(
            "SELECT query,
                    COUNT(*) AS search_count,
                    COUNT(DISTINCT user_id) AS unique_users,
                    COALESCE(AVG(result_count), 0)::FLOAT8 AS avg_results,
                    MAX(searched_at) AS last_searched
             FROM search_logs
             WHERE search_type = 'search' AND query <> '' AND searched_at >= $1{zero_filter}
             GROUP BY query
             ORDER BY search_count DESC, query ASC
             LIMIT $2"
        );
        let rows = self.query_with_timeout(&sql, &[&start, &capped_limit]).await?;

        Ok(rows
            .into_iter()
            .map(|r| SearchTerm {
                query: r.get(0),
                search_count: r.get(1),
                unique_users: r.get(2),
                avg_results: r.get(3),
                last_searched: r.get(4),
            })
            .collect())
    }

    async fn get_search_trend_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<SearchDay>> {
        let capped_limit = limit.min(MAX_REPORT_ROWS);
        let rows = self
            .query_with_timeout(
                "SELECT DATE(searched_at) AS day,
                        COUNT(*) AS searches,
                        COUNT(DISTINCT query) AS unique_queries,
                        COUNT(DISTINCT user_id) AS unique_users
                 FROM search_logs
                 WHERE search_type = 'search' AND searched_at >= $1
                 GROUP BY day
                 ORDER BY day DESC
                 LIMIT $2",
                &[&start, &capped_limit],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| SearchDay {
                date: r.get(0),
                searches: r.get(1),
                unique_queries: r.get(2),
                unique_users: r.get(3),
            })
            .collect())
    }

    async fn get_search_totals_since(&self, start: DateTime<Utc>) -> anyhow::Result<SearchTotals> {
        let row = self
            .query_one_with_timeout(
                "SELECT COUNT(*),
                        COUNT(DISTINCT query),
                        COUNT(DISTINCT user_id),
                        COALESCE(AVG(result_count), 0)::FLOAT8,
                        COUNT(*) FILTER (WHERE result_count = 0)
                 FROM search_logs
                 WHERE search_type = 'search' AND searched_at >= $1",
                &[&start],
            )
            .await?;

        Ok(SearchTotals {
            total_searches: row.get(0),
            unique_queries: row.get(1),
            unique_users: row.get(2),
            avg_results: row.get(3),
            zero_result_searches: row.get(4),
        })
    }

    async fn get_category_matches_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<CategoryMatch>> {
        let capped_limit = limit.min(MAX_REPORT_ROWS);
        let subqueries = ContentType::ALL
            .iter()
            .map(|t| category_match_subquery(t.table(), matches!(t, ContentType::Book)))
            .collect::<Vec<_>>()
            .join("\n             UNION ALL\n             ");
        let sql = format!(
            "SELECT category, SUM(matches)::BIGINT AS matches
             FROM ({subqueries}) per_table
             GROUP BY category
             ORDER BY matches DESC, category ASC
             LIMIT $2"
        );
        let rows = self.query_with_timeout(&sql, &[&start, &capped_limit]).await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryMatch {
                category: r.get(0),
                matches: r.get(1),
            })
            .collect())
    }

    async fn ensure_tracking_tables(&self) -> anyhow::Result<()> {
        tracing::debug!("Repository: ensuring tracking tables exist");

        let client = self.pool.get().await?;
        client.batch_execute(TRACKING_SCHEMA).await?;
        Ok(())
    }
}
