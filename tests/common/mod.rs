//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use trace_interceptor::TracerService;

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const SPAN_ID: &str = "00f067aa0ba902b7";

/// A tracer service that keeps finished spans in memory.
pub struct TestTracer {
    pub service: Arc<TracerService>,
    pub exporter: InMemorySpanExporter,
}

impl TestTracer {
    pub fn new(propagators: &[&str]) -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let propagators: Vec<String> = propagators.iter().map(|p| p.to_string()).collect();
        Self {
            service: Arc::new(TracerService::with_provider(provider, &propagators)),
            exporter,
        }
    }

    pub fn jaeger() -> Self {
        Self::new(&["jaeger"])
    }

    pub fn finished(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    /// The single finished span with `name`; panics if there are zero or several.
    pub fn only(&self, name: &str) -> SpanData {
        let mut matching: Vec<SpanData> = self
            .finished()
            .into_iter()
            .filter(|span| span.name == name)
            .collect();
        assert_eq!(matching.len(), 1, "expected exactly one `{name}` span");
        matching.remove(0)
    }
}

pub fn attribute(span: &SpanData, key: &str) -> Option<Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

pub fn jaeger_header() -> String {
    format!("{TRACE_ID}:{SPAN_ID}:0:1")
}
