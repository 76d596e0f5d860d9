// HTTP metrics
pub const METRIC_HTTP_REQUESTS: &str = "backoffice.http.requests";
pub const METRIC_HTTP_DURATION: &str = "backoffice.http.duration";

// Tags
pub const TAG_ENVIRONMENT: &str = "environment";
pub const TAG_STATUS_CODE: &str = "status_code";
pub const TAG_ENDPOINT: &str = "endpoint";
pub const TAG_METHOD: &str = "method";

/// Get environment from ENV or default to "development"
pub fn get_environment() -> &'static str {
    static ENVIRONMENT: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    ENVIRONMENT
        .get_or_init(|| std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
}
