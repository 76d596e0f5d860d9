pub mod activity;
pub mod analytics;
pub mod metrics;
pub mod types;

pub use types::{ContentId, OrderId, UserId};
