//! HTTP front end for the redirect handler
pub mod admin;
pub mod http;
pub mod metrics;
pub mod middleware;
pub mod service;

pub use admin::AdminService;
pub use metrics::{MetricsCollector, MetricsMiddleware};
pub use middleware::{LoggingMiddleware, Middleware, MiddlewareChain, MiddlewareContext};
pub use service::RedirectService;
