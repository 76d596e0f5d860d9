use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// One row of the store's activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: Option<UserId>,
    pub action: String,
    pub detail: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// Detail column rendered for display: pretty-printed when it holds
    /// JSON, returned verbatim otherwise.
    pub fn detail_display(&self) -> Option<String> {
        self.detail.as_ref().map(|raw| {
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(value) => {
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.clone())
                }
                Err(_) => raw.clone(),
            }
        })
    }
}

/// Filters for browsing the activity log
#[derive(Debug, Clone, Default)]
pub struct ActivityLogQuery {
    /// Case-insensitive substring match over action and detail.
    pub search: Option<String>,
    pub user_id: Option<UserId>,
    /// Exact action name.
    pub action: Option<String>,
    /// Entries created on this calendar day.
    pub date: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of activity plus the filter metadata the viewer needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ActivityLogPage {
    pub entries: Vec<ActivityLogEntry>,
    pub total: i64,
    pub actions: Vec<String>,
}

/// Repository trait for activity log reads
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Query entries with filters and pagination, newest first. Returns
    /// the page plus the total row count matching the filters.
    async fn query_activity(
        &self,
        query: &ActivityLogQuery,
    ) -> anyhow::Result<(Vec<ActivityLogEntry>, i64)>;

    /// Distinct action names, for filter dropdowns
    async fn list_actions(&self) -> anyhow::Result<Vec<String>>;
}

/// Service trait for browsing the activity log
#[async_trait]
pub trait ActivityLogService: Send + Sync {
    /// Fetch a page of activity together with the known action names.
    async fn query(&self, query: ActivityLogQuery) -> anyhow::Result<ActivityLogPage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(detail: Option<&str>) -> ActivityLogEntry {
        ActivityLogEntry {
            id: 1,
            user_id: Some(UserId::new(7)),
            action: "order.created".to_string(),
            detail: detail.map(|d| d.to_string()),
            ip_address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_detail_display_pretty_prints_json() {
        let entry = entry(Some(r#"{"order_id":42,"total":19.5}"#));
        let display = entry.detail_display().unwrap();
        assert!(display.contains("\"order_id\": 42"));
        assert!(display.contains('\n'));
    }

    #[test]
    fn test_detail_display_returns_raw_text_unchanged() {
        let entry = entry(Some("checkout via admin panel"));
        assert_eq!(
            entry.detail_display().unwrap(),
            "checkout via admin panel"
        );
    }

    #[test]
    fn test_detail_display_none_when_absent() {
        assert_eq!(entry(None).detail_display(), None);
    }
}
