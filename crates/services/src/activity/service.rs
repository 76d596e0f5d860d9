use async_trait::async_trait;
use std::sync::Arc;

use super::ports::{ActivityLogPage, ActivityLogQuery, ActivityLogRepository, ActivityLogService};

pub struct ActivityLogServiceImpl {
    repository: Arc<dyn ActivityLogRepository>,
}

impl ActivityLogServiceImpl {
    pub fn new(repository: Arc<dyn ActivityLogRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ActivityLogService for ActivityLogServiceImpl {
    async fn query(&self, query: ActivityLogQuery) -> anyhow::Result<ActivityLogPage> {
        tracing::debug!(
            "Querying activity log: limit={}, offset={}",
            query.limit,
            query.offset
        );

        let (entries, total) = self.repository.query_activity(&query).await?;
        let actions = self.repository.list_actions().await?;

        Ok(ActivityLogPage {
            entries,
            total,
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::test_helpers::InMemoryActivityLogRepository;
    use crate::activity::ActivityLogEntry;
    use crate::UserId;
    use chrono::{Duration, TimeZone, Utc};

    fn seeded_repository() -> Arc<InMemoryActivityLogRepository> {
        let repository = Arc::new(InMemoryActivityLogRepository::default());
        let base = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        for (id, user, action, detail, days_ago) in [
            (1, 1, "order.created", Some(r#"{"total":30.0}"#), 0),
            (2, 1, "order.refunded", None, 1),
            (3, 2, "user.login", Some("password login"), 1),
            (4, 2, "order.created", Some(r#"{"total":12.0}"#), 2),
        ] {
            repository.add_entry(ActivityLogEntry {
                id,
                user_id: Some(UserId::new(user)),
                action: action.to_string(),
                detail: detail.map(|d| d.to_string()),
                ip_address: None,
                created_at: base - Duration::days(days_ago),
            });
        }
        repository
    }

    #[tokio::test]
    async fn test_query_returns_newest_first_with_actions() {
        let service = ActivityLogServiceImpl::new(seeded_repository());

        let page = service
            .query(ActivityLogQuery {
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(page.entries.len(), 4);
        assert_eq!(page.entries[0].id, 1);
        assert_eq!(
            page.actions,
            vec!["order.created", "order.refunded", "user.login"]
        );
    }

    #[tokio::test]
    async fn test_query_filters_by_action_and_user() {
        let service = ActivityLogServiceImpl::new(seeded_repository());

        let page = service
            .query(ActivityLogQuery {
                action: Some("order.created".to_string()),
                user_id: Some(UserId::new(2)),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].id, 4);
    }

    #[tokio::test]
    async fn test_query_search_matches_action_and_detail() {
        let service = ActivityLogServiceImpl::new(seeded_repository());

        let by_action = service
            .query(ActivityLogQuery {
                search: Some("REFUND".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_action.total, 1);
        assert_eq!(by_action.entries[0].id, 2);

        let by_detail = service
            .query(ActivityLogQuery {
                search: Some("password".to_string()),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_detail.total, 1);
        assert_eq!(by_detail.entries[0].id, 3);
    }

    #[tokio::test]
    async fn test_query_pagination_keeps_full_total() {
        let service = ActivityLogServiceImpl::new(seeded_repository());

        let page = service
            .query(ActivityLogQuery {
                limit: 2,
                offset: 2,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(page.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_query_filters_by_calendar_day() {
        let service = ActivityLogServiceImpl::new(seeded_repository());

        let page = service
            .query(ActivityLogQuery {
                date: chrono::NaiveDate::from_ymd_opt(2024, 6, 14),
                limit: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert!(page.entries.iter().all(|e| e.created_at.date_naive()
            == chrono::NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()));
    }
}
