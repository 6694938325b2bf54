//! Request tracing as an axum middleware function.
//!
//! Equivalent to [`RequestTracingLayer`](crate::http::RequestTracingLayer)
//! for routers that compose middleware with `from_fn_with_state`:
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/users/{id}", get(get_user))
//!     .layer(axum::middleware::from_fn_with_state(tracer, trace_request));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use opentelemetry::context::FutureExt as _;

use crate::http::span::{Outcome, SpanGuard};
use crate::observability::TracerService;

/// Wrap the rest of the chain in a request span.
///
/// If this future is dropped before `next` completes, the guard finishes
/// the span as cancelled.
pub async fn trace_request(
    State(tracer): State<Arc<TracerService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut guard = SpanGuard::start(&tracer, &request);
    let span = guard.request_span().clone();
    let otel_cx = span.context().clone();
    request.extensions_mut().insert(span);

    let response = next.run(request).with_context(otel_cx).await;
    guard.finish(Outcome::Response(response.status()));
    response
}
