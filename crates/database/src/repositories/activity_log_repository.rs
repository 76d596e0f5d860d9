use crate::pool::DbPool;
use async_trait::async_trait;
use services::activity::{ActivityLogEntry, ActivityLogQuery, ActivityLogRepository};

pub struct PostgresActivityLogRepository {
    pool: DbPool,
}

impl PostgresActivityLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Helper to build dynamic WHERE clauses and collect parameterized values.
struct QueryBuilder {
    conditions: Vec<String>,
    params: Vec<Box<dyn tokio_postgres::types::ToSql + Sync + Send>>,
}

impl QueryBuilder {
    fn new() -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Current 1-based parameter index for the next parameter.
    fn next_param_idx(&self) -> u32 {
        self.params.len() as u32 + 1
    }

    /// Push a condition with a parameterized value.
    fn push<T: tokio_postgres::types::ToSql + Sync + Send + 'static>(
        &mut self,
        col: &str,
        op: &str,
        value: T,
    ) {
        let idx = self.next_param_idx();
        self.conditions.push(format!("{col} {op} ${idx}"));
        self.params.push(Box::new(value));
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn param_refs(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref() as _).collect()
    }
}

#[async_trait]
impl ActivityLogRepository for PostgresActivityLogRepository {
    async fn query_activity(
        &self,
        query: &ActivityLogQuery,
    ) -> anyhow::Result<(Vec<ActivityLogEntry>, i64)> {
        let client = self.pool.get().await?;

        let mut qb = QueryBuilder::new();

        if let Some(ref term) = query.search {
            // One pattern parameter matched against both text columns.
            let idx = qb.next_param_idx();
            qb.conditions
                .push(format!("(action ILIKE ${idx} OR detail ILIKE ${idx})"));
            qb.params.push(Box::new(format!("%{term}%")));
        }
        if let Some(user_id) = query.user_id {
            qb.push("user_id", "=", user_id);
        }
        if let Some(ref action) = query.action {
            qb.push("action", "=", action.clone());
        }
        if let Some(date) = query.date {
            qb.push("created_at::DATE", "=", date);
        }

        let where_clause = qb.where_clause();

        // Use COUNT(*) OVER() window function to get total in a single query
        let limit_idx = qb.next_param_idx();
        let offset_idx = limit_idx + 1;
        let sql = format!(
            "SELECT id, user_id, action, detail, ip_address, created_at,
                    COUNT(*) OVER() AS total_count
             FROM activity_logs
             {where_clause}
             ORDER BY created_at DESC
             LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        qb.params.push(Box::new(query.limit));
        qb.params.push(Box::new(query.offset));

        let rows = client.query(&sql, &qb.param_refs()).await?;

        let total: i64 = rows.first().map(|r| r.get(6)).unwrap_or(0);

        let entries = rows
            .into_iter()
            .map(|r| ActivityLogEntry {
                id: r.get(0),
                user_id: r.get(1),
                action: r.get(2),
                detail: r.get(3),
                ip_address: r.get(4),
                created_at: r.get(5),
            })
            .collect();

        Ok((entries, total))
    }

    async fn list_actions(&self) -> anyhow::Result<Vec<String>> {
        let client = self.pool.get().await?;

        let rows = client
            .query(
                "SELECT DISTINCT action FROM activity_logs ORDER BY action",
                &[],
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.get(0)).collect())
    }
}
