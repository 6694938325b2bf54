//! Process-wide tracer service.
//!
//! Built once at startup from [`TracerConfig`] and shared behind an `Arc`
//! with every request. Holds the tracer that starts request spans, the
//! propagator that decodes and encodes trace context headers, and the
//! provider that owns export so it can be flushed on shutdown.

use std::fmt;

use http::HeaderMap;
use opentelemetry::global::BoxedTracer;
use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator};
use opentelemetry::trace::noop::NoopTracer;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::Context;
use opentelemetry_http::HeaderInjector;
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::{ReporterKind, SamplerConfig, SamplerKind, TracerConfig};
use crate::observability::exporter::LoggingSpanExporter;

const INSTRUMENTATION_SCOPE: &str = env!("CARGO_PKG_NAME");

/// Errors raised by the tracer service outside the request path.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("failed to flush spans: {0}")]
    Flush(#[source] OTelSdkError),

    #[error("failed to shut down tracer provider: {0}")]
    Shutdown(#[source] OTelSdkError),
}

/// Shared tracer, propagator and provider.
pub struct TracerService {
    tracer: BoxedTracer,
    propagator: TextMapCompositePropagator,
    provider: Option<SdkTracerProvider>,
}

impl TracerService {
    /// Build the service from configuration.
    ///
    /// A disabled tracer or a `none` reporter produces a no-op tracer so
    /// request handling never depends on tracing infrastructure.
    pub fn init(config: &TracerConfig) -> Self {
        let propagator = build_propagator(&config.propagators);

        match build_provider(config) {
            Some(provider) => {
                tracing::info!(
                    service_name = %config.service_name,
                    propagators = ?config.propagators,
                    sampler = ?config.sampler.kind,
                    sampler_param = config.sampler.param,
                    reporter = ?config.reporter.kind,
                    batch = config.reporter.batch,
                    "Tracer initialized"
                );
                Self::from_parts(provider, propagator)
            }
            None => {
                tracing::info!(
                    enabled = config.enabled,
                    reporter = ?config.reporter.kind,
                    "No span reporter configured, using no-op tracer"
                );
                Self {
                    tracer: BoxedTracer::new(Box::new(NoopTracer::new())),
                    propagator,
                    provider: None,
                }
            }
        }
    }

    /// Wrap an already-built provider, e.g. one exporting to memory in tests.
    pub fn with_provider(provider: SdkTracerProvider, propagators: &[String]) -> Self {
        Self::from_parts(provider, build_propagator(propagators))
    }

    /// A tracer that records nothing but still understands incoming context.
    pub fn noop(propagators: &[String]) -> Self {
        Self {
            tracer: BoxedTracer::new(Box::new(NoopTracer::new())),
            propagator: build_propagator(propagators),
            provider: None,
        }
    }

    fn from_parts(provider: SdkTracerProvider, propagator: TextMapCompositePropagator) -> Self {
        let tracer = BoxedTracer::new(Box::new(provider.tracer(INSTRUMENTATION_SCOPE)));
        Self {
            tracer,
            propagator,
            provider: Some(provider),
        }
    }

    pub fn tracer(&self) -> &BoxedTracer {
        &self.tracer
    }

    pub fn propagator(&self) -> &dyn TextMapPropagator {
        &self.propagator
    }

    /// True when spans are dropped instead of exported.
    pub fn is_noop(&self) -> bool {
        self.provider.is_none()
    }

    /// Encode `cx` into outbound request headers.
    pub fn inject(&self, cx: &Context, headers: &mut HeaderMap) {
        self.propagator
            .inject_context(cx, &mut HeaderInjector(headers));
    }

    /// Export any spans still buffered by a batch reporter.
    pub fn force_flush(&self) -> Result<(), TracingError> {
        match &self.provider {
            Some(provider) => provider.force_flush().map_err(TracingError::Flush),
            None => Ok(()),
        }
    }

    /// Flush and stop the provider. Spans finished afterwards are dropped.
    pub fn shutdown(&self) -> Result<(), TracingError> {
        match &self.provider {
            Some(provider) => {
                provider.shutdown().map_err(TracingError::Shutdown)?;
                tracing::info!("Tracer shut down");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TracerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracerService")
            .field("propagator", &self.propagator)
            .field("noop", &self.is_noop())
            .finish()
    }
}

fn build_propagator(names: &[String]) -> TextMapCompositePropagator {
    let mut propagators: Vec<Box<dyn TextMapPropagator + Send + Sync>> = Vec::new();
    for name in names {
        match name.as_str() {
            "jaeger" => propagators.push(Box::new(opentelemetry_jaeger_propagator::Propagator::new())),
            "tracecontext" => propagators.push(Box::new(TraceContextPropagator::new())),
            other => tracing::warn!(propagator = %other, "Ignoring unknown propagator"),
        }
    }
    TextMapCompositePropagator::new(propagators)
}

fn build_provider(config: &TracerConfig) -> Option<SdkTracerProvider> {
    if !config.enabled {
        return None;
    }

    let builder = SdkTracerProvider::builder()
        .with_sampler(build_sampler(&config.sampler))
        .with_resource(
            Resource::builder()
                .with_service_name(config.service_name.clone())
                .build(),
        );

    let builder = match (config.reporter.kind, config.reporter.batch) {
        (ReporterKind::Logging, false) => builder.with_simple_exporter(LoggingSpanExporter),
        (ReporterKind::Logging, true) => builder.with_batch_exporter(LoggingSpanExporter),
        (ReporterKind::Stdout, false) => {
            builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        }
        (ReporterKind::Stdout, true) => {
            builder.with_batch_exporter(opentelemetry_stdout::SpanExporter::default())
        }
        (ReporterKind::None, _) => return None,
    };

    Some(builder.build())
}

fn build_sampler(config: &SamplerConfig) -> Sampler {
    let root = match config.kind {
        SamplerKind::Const if config.param > 0.0 => Sampler::AlwaysOn,
        SamplerKind::Const => Sampler::AlwaysOff,
        SamplerKind::Probabilistic => Sampler::TraceIdRatioBased(config.param),
    };

    if config.parent_based {
        Sampler::ParentBased(Box::new(root))
    } else {
        root
    }
}
