use crate::{
    consts::{LIST_ACTIVITY_LIMIT_DEFAULT, LIST_ACTIVITY_LIMIT_MAX},
    error::ApiError,
    state::AppState,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use services::{
    activity::{ActivityLogEntry, ActivityLogQuery},
    UserId,
};

// --- Request/Response types ---

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActivityEntryResponse {
    pub id: i64,
    pub user_id: Option<UserId>,
    pub action: String,
    /// Detail payload, pretty-printed when it holds JSON
    pub detail: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: String,
}

impl From<ActivityLogEntry> for ActivityEntryResponse {
    fn from(entry: ActivityLogEntry) -> Self {
        let detail = entry.detail_display();
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            detail,
            ip_address: entry.ip_address,
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ActivityListResponse {
    pub entries: Vec<ActivityEntryResponse>,
    /// Distinct action names, for filter dropdowns
    pub actions: Vec<String>,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ActivityQueryParams {
    /// Case-insensitive substring filter over action and detail
    pub search: Option<String>,
    /// Filter by user ID
    pub user_id: Option<UserId>,
    /// Filter by exact action name
    pub action: Option<String>,
    /// Filter by calendar day (YYYY-MM-DD)
    pub date: Option<String>,
    /// Maximum number of items (default: 50, max: 200)
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Number of items to skip (default: 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    LIST_ACTIVITY_LIMIT_DEFAULT
}

impl ActivityQueryParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.limit <= 0 {
            return Err(ApiError::bad_request("Limit must be positive"));
        }
        if self.limit > LIST_ACTIVITY_LIMIT_MAX {
            return Err(ApiError::bad_request(format!(
                "Limit cannot exceed {LIST_ACTIVITY_LIMIT_MAX}"
            )));
        }
        if self.offset < 0 {
            return Err(ApiError::bad_request("Offset cannot be negative"));
        }
        Ok(())
    }

    pub fn parse_date(&self) -> Result<Option<NaiveDate>, ApiError> {
        if let Some(ref date_str) = self.date {
            date_str
                .parse::<NaiveDate>()
                .map(Some)
                .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD."))
        } else {
            Ok(None)
        }
    }
}

// --- Handlers ---

/// Browse the store activity log
#[utoipa::path(
    get,
    path = "/v1/activity",
    tag = "Activity",
    params(
        ("search" = Option<String>, Query, description = "Substring filter over action and detail"),
        ("user_id" = Option<i64>, Query, description = "Filter by user ID"),
        ("action" = Option<String>, Query, description = "Filter by exact action name"),
        ("date" = Option<String>, Query, description = "Filter by calendar day (YYYY-MM-DD)"),
        ("limit" = Option<i64>, Query, description = "Maximum number of items (default: 50, max: 200)"),
        ("offset" = Option<i64>, Query, description = "Number of items to skip")
    ),
    responses(
        (status = 200, description = "Activity log page", body = ActivityListResponse),
        (status = 400, description = "Bad request", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    Query(params): Query<ActivityQueryParams>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    params.validate()?;
    let date = params.parse_date()?;

    let query = ActivityLogQuery {
        search: params.search.clone(),
        user_id: params.user_id,
        action: params.action.clone(),
        date,
        limit: params.limit,
        offset: params.offset,
    };

    let page = app_state.activity_service.query(query).await.map_err(|e| {
        tracing::error!("Failed to query activity log: {}", e);
        ApiError::internal_server_error("Failed to query activity log")
    })?;

    Ok(Json(ActivityListResponse {
        entries: page.entries.into_iter().map(Into::into).collect(),
        actions: page.actions,
        limit: params.limit,
        offset: params.offset,
        total: page.total,
    }))
}

/// Create activity routes router
pub fn create_activity_router() -> Router<AppState> {
    Router::new().route("/", get(list_activity))
}
