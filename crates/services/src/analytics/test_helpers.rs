//! In-memory repository fake for exercising the report calculators.
//!
//! Mirrors the aggregate semantics of the Postgres adapter: paid-status
//! gating, join behavior, tie-breaking and distinct counting.

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::ports::{
    CategoryMatch, ContentType, DailyRevenue, MetricsRepository, PagePopularity, PeriodCounts,
    PeriodOrderTotals, SearchDay, SearchTerm, SearchTotals, TopSeller, TotalCounts, TypeRevenue,
    VisitFrequency, PAID_ORDER_STATUSES,
};
use crate::ContentId;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub order_id: i64,
    pub content_id: i64,
    pub item_type: ContentType,
    pub unit_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ContentRecord {
    pub id: i64,
    pub content_type: ContentType,
    pub title: String,
    pub author: Option<String>,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PageViewRecord {
    pub page: String,
    pub session_id: String,
    pub user_id: Option<i64>,
    pub viewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchLogRecord {
    pub query: String,
    pub result_count: i64,
    pub user_id: Option<i64>,
    pub search_type: String,
    pub searched_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<UserRecord>,
    orders: Vec<OrderRecord>,
    order_items: Vec<OrderItemRecord>,
    content: Vec<ContentRecord>,
    page_views: Vec<PageViewRecord>,
    search_logs: Vec<SearchLogRecord>,
    fail: bool,
    tracking_initialized: bool,
}

/// Fake metrics store seeded row by row from tests.
#[derive(Default)]
pub struct InMemoryMetricsRepository {
    state: Mutex<State>,
}

impl InMemoryMetricsRepository {
    pub fn add_user(&self, user: UserRecord) {
        self.lock().users.push(user);
    }

    pub fn add_order(&self, order: OrderRecord) {
        self.lock().orders.push(order);
    }

    pub fn add_order_item(&self, item: OrderItemRecord) {
        self.lock().order_items.push(item);
    }

    pub fn add_content(&self, content: ContentRecord) {
        self.lock().content.push(content);
    }

    pub fn add_page_view(&self, view: PageViewRecord) {
        self.lock().page_views.push(view);
    }

    pub fn add_search_log(&self, log: SearchLogRecord) {
        self.lock().search_logs.push(log);
    }

    /// Make every repository call fail, as if the store were offline.
    pub fn set_failing(&self, fail: bool) {
        self.lock().fail = fail;
    }

    pub fn tracking_initialized(&self) -> bool {
        self.lock().tracking_initialized
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("lock metrics state")
    }
}

fn is_paid(status: &str) -> bool {
    PAID_ORDER_STATUSES.contains(&status)
}

fn matches_query(query_lower: &str, text: &str) -> bool {
    let text_lower = text.to_lowercase();
    text_lower.contains(query_lower) || query_lower.contains(&text_lower)
}

#[async_trait]
impl MetricsRepository for InMemoryMetricsRepository {
    async fn get_total_counts(&self) -> anyhow::Result<TotalCounts> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }
        Ok(TotalCounts {
            total_users: state.users.len() as i64,
            total_revenue: state
                .orders
                .iter()
                .filter(|o| is_paid(&o.status))
                .map(|o| o.total_amount)
                .sum(),
            total_orders: state.orders.len() as i64,
            total_content: state.content.iter().filter(|c| c.is_active).count() as i64,
        })
    }

    async fn get_counts_since(&self, start: DateTime<Utc>) -> anyhow::Result<PeriodCounts> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }
        Ok(PeriodCounts {
            new_users: state
                .users
                .iter()
                .filter(|u| u.created_at >= start)
                .count() as i64,
            revenue: state
                .orders
                .iter()
                .filter(|o| is_paid(&o.status) && o.created_at >= start)
                .map(|o| o.total_amount)
                .sum(),
            orders: state
                .orders
                .iter()
                .filter(|o| o.created_at >= start)
                .count() as i64,
            new_content: state
                .content
                .iter()
                .filter(|c| c.is_active && c.created_at >= start)
                .count() as i64,
        })
    }

    async fn get_top_sellers(
        &self,
        content_type: ContentType,
        limit: i64,
    ) -> anyhow::Result<Vec<TopSeller>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_content: BTreeMap<i64, (i64, f64)> = BTreeMap::new();
        for item in &state.order_items {
            if item.item_type != content_type {
                continue;
            }
            let paid_order = state
                .orders
                .iter()
                .any(|o| o.id == item.order_id && is_paid(&o.status));
            let in_catalog = state
                .content
                .iter()
                .any(|c| c.id == item.content_id && c.content_type == content_type);
            if !paid_order || !in_catalog {
                continue;
            }
            let entry = by_content.entry(item.content_id).or_insert((0, 0.0));
            entry.0 += item.quantity;
            entry.1 += item.unit_price * item.quantity as f64;
        }

        let mut sellers: Vec<TopSeller> = by_content
            .into_iter()
            .map(|(content_id, (sales_count, revenue))| {
                let title = state
                    .content
                    .iter()
                    .find(|c| c.id == content_id && c.content_type == content_type)
                    .map(|c| c.title.clone())
                    .unwrap_or_default();
                TopSeller {
                    content_id: ContentId::new(content_id),
                    title,
                    sales_count,
                    revenue,
                }
            })
            .collect();
        sellers.sort_by(|a, b| {
            b.sales_count
                .cmp(&a.sales_count)
                .then(a.content_id.as_i64().cmp(&b.content_id.as_i64()))
        });
        sellers.truncate(limit.max(0) as usize);
        Ok(sellers)
    }

    async fn get_page_views_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<PagePopularity>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_page: BTreeMap<String, (i64, HashSet<&str>)> = BTreeMap::new();
        for view in state.page_views.iter().filter(|v| v.viewed_at >= start) {
            let entry = by_page
                .entry(view.page.clone())
                .or_insert_with(|| (0, HashSet::new()));
            entry.0 += 1;
            entry.1.insert(view.session_id.as_str());
        }

        let mut pages: Vec<PagePopularity> = by_page
            .into_iter()
            .map(|(page, (total_views, sessions))| PagePopularity {
                page,
                total_views,
                unique_views: sessions.len() as i64,
            })
            .collect();
        pages.sort_by(|a, b| b.total_views.cmp(&a.total_views).then(a.page.cmp(&b.page)));
        pages.truncate(limit.max(0) as usize);
        Ok(pages)
    }

    async fn get_daily_revenue_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyRevenue>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for order in state
            .orders
            .iter()
            .filter(|o| is_paid(&o.status) && o.created_at >= start)
        {
            *by_day.entry(order.created_at.date_naive()).or_insert(0.0) += order.total_amount;
        }
        Ok(by_day
            .into_iter()
            .map(|(date, revenue)| DailyRevenue { date, revenue })
            .collect())
    }

    async fn get_visit_frequency(&self) -> anyhow::Result<VisitFrequency> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut visits: BTreeMap<&str, i64> = BTreeMap::new();
        for view in &state.page_views {
            *visits.entry(view.session_id.as_str()).or_insert(0) += 1;
        }
        Ok(VisitFrequency {
            total_sessions: visits.len() as i64,
            returning_sessions: visits.values().filter(|&&count| count > 1).count() as i64,
        })
    }

    async fn get_order_totals_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<PeriodOrderTotals> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let paid: Vec<_> = state
            .orders
            .iter()
            .filter(|o| is_paid(&o.status) && o.created_at >= start)
            .collect();
        Ok(PeriodOrderTotals {
            order_count: paid.len() as i64,
            revenue: paid.iter().map(|o| o.total_amount).sum(),
        })
    }

    async fn get_distinct_buyers_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let buyers: HashSet<i64> = state
            .orders
            .iter()
            .filter(|o| is_paid(&o.status) && o.created_at >= start)
            .map(|o| o.user_id)
            .collect();
        Ok(buyers.len() as i64)
    }

    async fn get_distinct_visitors_since(&self, start: DateTime<Utc>) -> anyhow::Result<i64> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let sessions: HashSet<&str> = state
            .page_views
            .iter()
            .filter(|v| v.viewed_at >= start)
            .map(|v| v.session_id.as_str())
            .collect();
        Ok(sessions.len() as i64)
    }

    async fn get_revenue_by_type_since(
        &self,
        start: DateTime<Utc>,
    ) -> anyhow::Result<Vec<TypeRevenue>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut rows = Vec::new();
        for content_type in ContentType::ALL {
            let items: Vec<_> = state
                .order_items
                .iter()
                .filter(|item| item.item_type == content_type)
                .filter(|item| {
                    state
                        .orders
                        .iter()
                        .any(|o| o.id == item.order_id && is_paid(&o.status) && o.created_at >= start)
                })
                .collect();
            if items.is_empty() {
                continue;
            }
            let revenue = items
                .iter()
                .map(|item| item.unit_price * item.quantity as f64)
                .sum();
            rows.push(TypeRevenue {
                item_type: content_type,
                revenue,
            });
        }
        Ok(rows)
    }

    async fn get_search_terms_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
        zero_results_only: bool,
    ) -> anyhow::Result<Vec<SearchTerm>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_query: BTreeMap<String, (i64, HashSet<i64>, i64, DateTime<Utc>)> =
            BTreeMap::new();
        for log in state.search_logs.iter().filter(|l| {
            l.search_type == "search"
                && !l.query.is_empty()
                && l.searched_at >= start
                && (!zero_results_only || l.result_count == 0)
        }) {
            let entry = by_query
                .entry(log.query.clone())
                .or_insert_with(|| (0, HashSet::new(), 0, log.searched_at));
            entry.0 += 1;
            if let Some(user_id) = log.user_id {
                entry.1.insert(user_id);
            }
            entry.2 += log.result_count;
            if log.searched_at > entry.3 {
                entry.3 = log.searched_at;
            }
        }

        let mut terms: Vec<SearchTerm> = by_query
            .into_iter()
            .map(|(query, (count, users, result_sum, last_searched))| SearchTerm {
                query,
                search_count: count,
                unique_users: users.len() as i64,
                avg_results: result_sum as f64 / count as f64,
                last_searched,
            })
            .collect();
        terms.sort_by(|a, b| {
            b.search_count
                .cmp(&a.search_count)
                .then(a.query.cmp(&b.query))
        });
        terms.truncate(limit.max(0) as usize);
        Ok(terms)
    }

    async fn get_search_trend_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<SearchDay>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_day: BTreeMap<NaiveDate, (i64, HashSet<&str>, HashSet<i64>)> = BTreeMap::new();
        for log in state
            .search_logs
            .iter()
            .filter(|l| l.search_type == "search" && l.searched_at >= start)
        {
            let entry = by_day
                .entry(log.searched_at.date_naive())
                .or_insert_with(|| (0, HashSet::new(), HashSet::new()));
            entry.0 += 1;
            entry.1.insert(log.query.as_str());
            if let Some(user_id) = log.user_id {
                entry.2.insert(user_id);
            }
        }

        Ok(by_day
            .into_iter()
            .rev()
            .take(limit.max(0) as usize)
            .map(|(date, (searches, queries, users))| SearchDay {
                date,
                searches,
                unique_queries: queries.len() as i64,
                unique_users: users.len() as i64,
            })
            .collect())
    }

    async fn get_search_totals_since(&self, start: DateTime<Utc>) -> anyhow::Result<SearchTotals> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let logs: Vec<_> = state
            .search_logs
            .iter()
            .filter(|l| l.search_type == "search" && l.searched_at >= start)
            .collect();
        let total_searches = logs.len() as i64;
        let avg_results = if logs.is_empty() {
            0.0
        } else {
            logs.iter().map(|l| l.result_count).sum::<i64>() as f64 / total_searches as f64
        };
        Ok(SearchTotals {
            total_searches,
            unique_queries: logs
                .iter()
                .map(|l| l.query.as_str())
                .collect::<HashSet<_>>()
                .len() as i64,
            unique_users: logs
                .iter()
                .filter_map(|l| l.user_id)
                .collect::<HashSet<_>>()
                .len() as i64,
            avg_results,
            zero_result_searches: logs.iter().filter(|l| l.result_count == 0).count() as i64,
        })
    }

    async fn get_category_matches_since(
        &self,
        start: DateTime<Utc>,
        limit: i64,
    ) -> anyhow::Result<Vec<CategoryMatch>> {
        let state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }

        let mut by_category: BTreeMap<String, i64> = BTreeMap::new();
        for log in state
            .search_logs
            .iter()
            .filter(|l| l.search_type == "search" && !l.query.is_empty() && l.searched_at >= start)
        {
            let query_lower = log.query.to_lowercase();
            for item in &state.content {
                let mut matched = matches_query(&query_lower, &item.title);
                if !matched && item.content_type == ContentType::Book {
                    if let Some(author) = &item.author {
                        matched = matches_query(&query_lower, author);
                    }
                }
                if matched {
                    *by_category.entry(item.category.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut categories: Vec<CategoryMatch> = by_category
            .into_iter()
            .map(|(category, matches)| CategoryMatch { category, matches })
            .collect();
        categories.sort_by(|a, b| b.matches.cmp(&a.matches).then(a.category.cmp(&b.category)));
        categories.truncate(limit.max(0) as usize);
        Ok(categories)
    }

    async fn ensure_tracking_tables(&self) -> anyhow::Result<()> {
        let mut state = self.lock();
        if state.fail {
            bail!("metrics store offline");
        }
        state.tracking_initialized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_orphan_order_items_are_skipped() {
        let repository = InMemoryMetricsRepository::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        repository.add_order(OrderRecord {
            id: 1,
            user_id: 1,
            total_amount: 10.0,
            status: "completed".to_string(),
            created_at: now,
        });
        // No matching content row: the join must drop this item.
        repository.add_order_item(OrderItemRecord {
            order_id: 1,
            content_id: 999,
            item_type: ContentType::Book,
            unit_price: 10.0,
            quantity: 1,
        });

        let sellers = repository.get_top_sellers(ContentType::Book, 5).await.unwrap();
        assert!(sellers.is_empty());
    }

    #[tokio::test]
    async fn test_failing_repository_errors_every_call() {
        let repository = InMemoryMetricsRepository::default();
        repository.set_failing(true);
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(repository.get_total_counts().await.is_err());
        assert!(repository.get_counts_since(start).await.is_err());
        assert!(repository.get_visit_frequency().await.is_err());
        assert!(repository.get_search_totals_since(start).await.is_err());
        assert!(repository.ensure_tracking_tables().await.is_err());
        assert!(!repository.tracking_initialized());
    }
}
