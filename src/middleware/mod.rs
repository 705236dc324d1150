pub mod error_handler;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;

pub use error_handler::{error_response, ErrorHandler};
pub use metrics::{Metrics, MetricsCollector, MetricsMiddleware};
pub use rate_limit::{InMemoryRateLimiter, RateLimitMiddleware, RateLimiter};
pub use request_id::RequestId;
