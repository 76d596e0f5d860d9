//! Aggregated store reporting: dashboard, engagement, sales and search
//! analytics computed over the commerce and tracking tables.

pub mod dashboard;
pub mod engagement;
pub mod period;
pub mod ports;
pub mod sales;
pub mod search;
pub mod service;
pub mod test_helpers;

pub use period::{day_window_start, resolve_range_days, ReportingPeriod};
pub use ports::*;
pub use service::{AnalyticsFacade, AnalyticsService};
