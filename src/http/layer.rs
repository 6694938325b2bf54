//! Tower layer wrapping any HTTP service in a request span.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Request, Response};
use opentelemetry::context::FutureExt as _;
use tower::{Layer, Service};

use crate::http::span::{Outcome, SpanGuard};
use crate::observability::TracerService;

/// Layer that traces every request passing through the wrapped service.
#[derive(Debug, Clone)]
pub struct RequestTracingLayer {
    tracer: Arc<TracerService>,
}

impl RequestTracingLayer {
    pub fn new(tracer: Arc<TracerService>) -> Self {
        Self { tracer }
    }
}

impl<S> Layer<S> for RequestTracingLayer {
    type Service = RequestTracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTracingService {
            inner,
            tracer: Arc::clone(&self.tracer),
        }
    }
}

/// Service produced by [`RequestTracingLayer`].
///
/// Responses and errors from the inner service pass through untouched.
#[derive(Debug, Clone)]
pub struct RequestTracingService<S> {
    inner: S,
    tracer: Arc<TracerService>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestTracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + 'static,
    ReqBody: 'static,
    ResBody: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let mut guard = SpanGuard::start(&self.tracer, &request);
        let span = guard.request_span().clone();
        let otel_cx = span.context().clone();
        request.extensions_mut().insert(span);

        // The inner `call` may do work before returning its future.
        let response = {
            let _attached = otel_cx.clone().attach();
            self.inner.call(request)
        }
        .with_context(otel_cx);

        Box::pin(async move {
            let result = response.await;
            match &result {
                Ok(response) => guard.finish(Outcome::Response(response.status())),
                Err(err) => guard.finish(Outcome::Failed(err.to_string())),
            }
            result
        })
    }
}
