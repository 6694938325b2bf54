//! HTTP request tracing.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → carrier.rs   (normalize headers, decode parent context)
//!     → operation.rs (templated span name + request id list)
//!     → span.rs      (start span, attach RequestSpan to extensions)
//!     → downstream handlers (child spans via RequestSpan)
//!     → span.rs      (tag request_ids/status, finish exactly once)
//!     → response returned unchanged
//! ```
//!
//! `layer.rs` and `middleware/` are two entry points onto the same
//! lifecycle: a tower layer for any service and a function for
//! `axum::middleware::from_fn_with_state`.

pub mod carrier;
pub mod layer;
pub mod middleware;
pub mod operation;
pub mod server;
pub mod span;

pub use carrier::HeaderCarrier;
pub use layer::{RequestTracingLayer, RequestTracingService};
pub use middleware::trace_request;
pub use operation::OperationName;
pub use server::HttpServer;
pub use span::{Outcome, RequestSpan, SpanGuard, SpanState};
