pub mod consts;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use error::{ApiError, ApiErrorResponse};
pub use middleware::{http_metrics_middleware, MetricsState};
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_cors};
pub use state::AppState;
