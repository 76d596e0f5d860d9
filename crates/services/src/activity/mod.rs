//! Read-only viewer over the store's activity log.

pub mod ports;
pub mod service;
pub mod test_helpers;

pub use ports::{
    ActivityLogEntry, ActivityLogPage, ActivityLogQuery, ActivityLogRepository, ActivityLogService,
};
pub use service::ActivityLogServiceImpl;
