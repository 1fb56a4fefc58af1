//! # Actix Middleware Library
//!
//! Middleware shared by Collab Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer token authentication, exposes [`UserId`] to handlers
//! - `correlation_id`: request correlation ids propagated into tracing spans
//! - `logging`: request/response logging
//! - `metrics`: Prometheus request counters and latency histograms

pub mod correlation_id;
pub mod jwt_auth;
pub mod logging;
pub mod metrics;

pub use correlation_id::{get_correlation_id, CorrelationId, CorrelationIdMiddleware};
pub use jwt_auth::{AuthRejection, Claims, JwtAuthMiddleware, JwtValidator, UserId};
pub use logging::Logging;
pub use metrics::MetricsMiddleware;
