//! Request span lifecycle.
//!
//! ```text
//! UNSTARTED ──SpanGuard::start──▶ STARTED ──finish / Drop──▶ FINISHED
//! ```
//!
//! A [`SpanGuard`] owns the request span from start to finish. Its `Drop`
//! impl is the cleanup path of last resort: if the downstream future is
//! dropped or a handler panics, the span is still tagged and ended. Finishing
//! twice is a no-op, so the span is ended exactly once on every exit path.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, Request, StatusCode};
use opentelemetry::global::BoxedSpan;
use opentelemetry::trace::{SpanContext, SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};

use crate::http::carrier::{extract_parent, HeaderCarrier};
use crate::http::operation::OperationName;
use crate::observability::TracerService;

pub const METHOD_TAG: &str = "method";
pub const PATH_TAG: &str = "path";
pub const REQUEST_IDS_TAG: &str = "request_ids";
pub const STATUS_TAG: &str = "status";

/// Handle to the current request's span, stored in request extensions.
///
/// Handlers take it as an extractor to start child spans or to propagate
/// the trace on outbound calls.
#[derive(Clone)]
pub struct RequestSpan {
    cx: Context,
    tracer: Arc<TracerService>,
}

impl RequestSpan {
    /// Context carrying the request span as its active span.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn span_context(&self) -> SpanContext {
        self.cx.span().span_context().clone()
    }

    /// Start a span parented to the request span. The caller ends it.
    pub fn child(&self, name: impl Into<Cow<'static, str>>) -> BoxedSpan {
        self.tracer
            .tracer()
            .start_with_context(name, &self.cx)
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Write the request's trace context into outbound headers.
    pub fn inject(&self, headers: &mut HeaderMap) {
        self.tracer.inject(&self.cx, headers);
    }
}

impl fmt::Debug for RequestSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpan")
            .field("span_context", self.cx.span().span_context())
            .finish()
    }
}

impl<S> FromRequestParts<S> for RequestSpan
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestSpan>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request span missing; is the tracing interceptor installed?",
        ))
    }
}

/// Lifecycle state of a guarded span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanState {
    Started,
    Finished,
}

/// How downstream handling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A response was produced.
    Response(StatusCode),
    /// The inner service returned an error.
    Failed(String),
    /// The request future was dropped or unwound before completing.
    Cancelled,
}

/// Owns one request span and guarantees it is finished exactly once.
pub struct SpanGuard {
    span: RequestSpan,
    request_ids: String,
    state: SpanState,
}

impl SpanGuard {
    /// Extract upstream context, name the operation and start the span.
    pub fn start<B>(tracer: &Arc<TracerService>, request: &Request<B>) -> Self {
        let carrier = HeaderCarrier::from_headers(request.headers());
        let parent = extract_parent(tracer.propagator(), &carrier);

        let uri = request.uri();
        let full_path = uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| uri.path());
        let method = request.method().as_str();
        let operation = OperationName::new(method, full_path);

        let remote_parent = parent.is_some();
        let parent_cx = parent.unwrap_or_else(Context::new);

        let span = tracer
            .tracer()
            .span_builder(operation.name.clone())
            .with_kind(SpanKind::Server)
            .with_attributes([
                KeyValue::new(METHOD_TAG, method.to_string()),
                KeyValue::new(PATH_TAG, operation.path.clone()),
            ])
            .start_with_context(tracer.tracer(), &parent_cx);
        let cx = parent_cx.with_span(span);

        tracing::debug!(
            operation = %operation.name,
            trace_id = %cx.span().span_context().trace_id(),
            remote_parent,
            "Request span started"
        );

        Self {
            span: RequestSpan {
                cx,
                tracer: Arc::clone(tracer),
            },
            request_ids: operation.request_ids_tag(),
            state: SpanState::Started,
        }
    }

    pub fn request_span(&self) -> &RequestSpan {
        &self.span
    }

    pub fn state(&self) -> SpanState {
        self.state
    }

    /// Tag the span with the outcome and end it. Later calls do nothing.
    pub fn finish(&mut self, outcome: Outcome) {
        if self.state == SpanState::Finished {
            return;
        }
        self.state = SpanState::Finished;

        let span = self.span.cx.span();
        span.set_attribute(KeyValue::new(
            REQUEST_IDS_TAG,
            std::mem::take(&mut self.request_ids),
        ));
        match outcome {
            Outcome::Response(status) => {
                span.set_attribute(KeyValue::new(STATUS_TAG, i64::from(status.as_u16())));
                if status.is_server_error() {
                    span.set_status(Status::error(status.to_string()));
                }
            }
            Outcome::Failed(message) => span.set_status(Status::error(message)),
            Outcome::Cancelled => {
                tracing::debug!("Request ended before a response was produced");
                span.set_status(Status::error("request cancelled"));
            }
        }
        span.end();
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.finish(Outcome::Cancelled);
    }
}

impl fmt::Debug for SpanGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanGuard")
            .field("span", &self.span)
            .field("state", &self.state)
            .finish()
    }
}
