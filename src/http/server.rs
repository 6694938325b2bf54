//! Demo HTTP server wrapped by the request tracing interceptor.
//!
//! # Responsibilities
//! - Create Axum Router with a few representative handlers
//! - Wire up middleware (request spans, access logs)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use opentelemetry::trace::Span as _;
use opentelemetry::KeyValue;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::layer::RequestTracingLayer;
use crate::http::span::RequestSpan;
use crate::observability::TracerService;

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server sharing the given tracer.
    pub fn new(config: AppConfig, tracer: Arc<TracerService>) -> Self {
        let router = Self::build_router(tracer);
        Self { router, config }
    }

    /// The request span layer sits inside `TraceLayer` so access logs cover
    /// the whole traced request.
    pub fn build_router(tracer: Arc<TracerService>) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/users/{id}", get(get_user))
            .route("/users/{id}/orders/{order}", get(get_order))
            .layer(RequestTracingLayer::new(tracer))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            configured = %self.config.server.bind_address,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn get_user(span: RequestSpan, Path(id): Path<u64>) -> impl IntoResponse {
    let mut lookup = span.child("load_user");
    lookup.set_attribute(KeyValue::new("user.id", attribute_id(id)));
    lookup.end();

    if id == 0 {
        return (StatusCode::NOT_FOUND, "No such user".to_string());
    }
    (StatusCode::OK, format!("user {}", id))
}

async fn get_order(span: RequestSpan, Path((id, order)): Path<(u64, u64)>) -> impl IntoResponse {
    let mut lookup = span.child("load_order");
    lookup.set_attribute(KeyValue::new("user.id", attribute_id(id)));
    lookup.set_attribute(KeyValue::new("order.id", attribute_id(order)));
    lookup.end();

    format!("order {} of user {}", order, id)
}

/// Span attributes are signed, so ids past `i64::MAX` saturate.
fn attribute_id(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

/// Wait for Ctrl+C or an explicit shutdown broadcast.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
