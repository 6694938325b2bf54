//! Span exporter that reports finished spans through the log pipeline.
//!
//! Useful when no collector is reachable: every finished span becomes one
//! structured `tracing` event, so it lands wherever logs already go.

use std::future;
use std::time::Duration;

use opentelemetry::trace::Status;
use opentelemetry_sdk::error::OTelSdkResult;
use opentelemetry_sdk::trace::{SpanData, SpanExporter};

/// Emits each finished span as an `info` event on the `span_report` target.
#[derive(Debug, Default)]
pub struct LoggingSpanExporter;

impl SpanExporter for LoggingSpanExporter {
    fn export(&self, batch: Vec<SpanData>) -> impl future::Future<Output = OTelSdkResult> + Send {
        for span in &batch {
            report(span);
        }
        future::ready(Ok(()))
    }
}

fn report(span: &SpanData) {
    let duration = span
        .end_time
        .duration_since(span.start_time)
        .unwrap_or(Duration::ZERO);

    let attributes = span
        .attributes
        .iter()
        .map(|kv| format!("{}={}", kv.key, kv.value))
        .collect::<Vec<_>>()
        .join(" ");

    let error = match &span.status {
        Status::Error { description } => Some(description.to_string()),
        _ => None,
    };

    tracing::info!(
        target: "span_report",
        name = %span.name,
        trace_id = %span.span_context.trace_id(),
        span_id = %span.span_context.span_id(),
        parent_span_id = %span.parent_span_id,
        duration_ms = duration.as_secs_f64() * 1000.0,
        attributes = %attributes,
        error = ?error,
        "span finished"
    );
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use opentelemetry::trace::{Span as _, Tracer as _, TracerProvider as _};
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn finished_spans(fail: bool) -> Vec<SpanData> {
        let memory = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(memory.clone())
            .build();

        let mut span = provider.tracer("test").start("GET users/id");
        span.set_attribute(KeyValue::new("request_ids", "42"));
        if fail {
            span.set_status(Status::error("boom"));
        }
        span.end();

        memory.get_finished_spans().unwrap()
    }

    async fn report_with_capture(spans: Vec<SpanData>) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        LoggingSpanExporter.export(spans).await.unwrap();
        captured.text()
    }

    #[tokio::test]
    async fn finished_span_is_reported_with_ids_and_attributes() {
        let spans = finished_spans(false);
        let trace_id = spans[0].span_context.trace_id().to_string();
        let span_id = spans[0].span_context.span_id().to_string();

        let output = report_with_capture(spans).await;
        assert!(output.contains("span_report"), "{output}");
        assert!(output.contains("span finished"), "{output}");
        assert!(output.contains("GET users/id"), "{output}");
        assert!(output.contains(&trace_id), "{output}");
        assert!(output.contains(&span_id), "{output}");
        assert!(output.contains("duration_ms="), "{output}");
        assert!(output.contains("request_ids=42"), "{output}");
        assert!(output.contains("error=None"), "{output}");
    }

    #[tokio::test]
    async fn errored_span_reports_description() {
        let output = report_with_capture(finished_spans(true)).await;
        assert!(output.contains("error=Some(\"boom\")"), "{output}");
    }
}
