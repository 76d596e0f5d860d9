//! HTTP metrics middleware for tracking request counts and latencies.
//!
//! This middleware records low-cardinality metrics for all HTTP requests:
//! - `backoffice.http.requests` - Count of HTTP requests by method, endpoint, status
//! - `backoffice.http.duration` - Histogram of request durations by method, endpoint
//!
//! Endpoints are normalized to replace numeric IDs with `{id}` to reduce cardinality.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use services::metrics::{
    consts::{
        get_environment, METRIC_HTTP_DURATION, METRIC_HTTP_REQUESTS, TAG_ENDPOINT,
        TAG_ENVIRONMENT, TAG_METHOD, TAG_STATUS_CODE,
    },
    MetricsServiceTrait,
};
use std::sync::Arc;
use std::time::Instant;

/// State for the metrics middleware
#[derive(Clone)]
pub struct MetricsState {
    pub metrics_service: Arc<dyn MetricsServiceTrait>,
}

/// Middleware that records HTTP request metrics
pub async fn http_metrics_middleware(
    State(state): State<MetricsState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let duration = start.elapsed();
    let status = response.status().as_u16();

    // Normalize path to reduce cardinality (replace numeric IDs with {id})
    let endpoint = normalize_path(&path);
    let environment = get_environment();

    let tags = [
        format!("{TAG_METHOD}:{method}"),
        format!("{TAG_ENDPOINT}:{endpoint}"),
        format!("{TAG_STATUS_CODE}:{status}"),
        format!("{TAG_ENVIRONMENT}:{environment}"),
    ];
    let tags_str: Vec<&str> = tags.iter().map(|s| s.as_str()).collect();

    state
        .metrics_service
        .record_latency(METRIC_HTTP_DURATION, duration, &tags_str);
    state
        .metrics_service
        .record_count(METRIC_HTTP_REQUESTS, 1, &tags_str);

    response
}

/// Normalize path by replacing numeric IDs with `{id}` to reduce cardinality.
///
/// Examples:
/// - `/v1/activity/42` -> `/v1/activity/{id}`
/// - `/v1/analytics/dashboard` -> `/v1/analytics/dashboard`
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_numeric_id(segment) {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Check if a path segment is a bare numeric ID
fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_id() {
        assert!(is_numeric_id("42"));
        assert!(is_numeric_id("1234567890"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("dashboard"));
        assert!(!is_numeric_id("42abc"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/v1/activity/42"), "/v1/activity/{id}");
        assert_eq!(
            normalize_path("/v1/analytics/dashboard"),
            "/v1/analytics/dashboard"
        );
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/v1/users/7/orders/19"), "/v1/users/{id}/orders/{id}");
    }
}
