//! Request-tracing interceptor for axum and tower services.
//!
//! Every inbound request gets an OpenTelemetry span that continues any
//! upstream trace found in the headers, is named after the method and the
//! id-templated path, and is finished exactly once however the request ends.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use crate::config::AppConfig;
pub use crate::http::{trace_request, HttpServer, RequestSpan, RequestTracingLayer};
pub use crate::lifecycle::Shutdown;
pub use crate::observability::TracerService;
