//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the interceptor and its demo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Tracer settings.
    pub tracer: TracerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "trace_interceptor=info,tower_http=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Process-wide tracer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracerConfig {
    /// When false the interceptor runs on a no-op tracer.
    pub enabled: bool,

    /// Reported as the `service.name` resource attribute.
    pub service_name: String,

    /// Reject unknown keys under `[tracer]` when loading from a file.
    pub validate: bool,

    /// Context propagation formats. Every one runs on extraction, in order,
    /// so when several headers are present the last valid one wins.
    /// Known names: `jaeger`, `tracecontext`.
    pub propagators: Vec<String>,

    pub sampler: SamplerConfig,

    pub reporter: ReporterConfig,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "trace-interceptor".to_string(),
            validate: true,
            propagators: vec!["jaeger".to_string()],
            sampler: SamplerConfig::default(),
            reporter: ReporterConfig::default(),
        }
    }
}

/// Sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SamplerKind {
    /// `param` 1 samples everything, 0 samples nothing.
    #[default]
    Const,
    /// `param` is the sampling ratio in `[0, 1]`.
    Probabilistic,
}

/// Sampler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplerConfig {
    #[serde(rename = "type")]
    pub kind: SamplerKind,

    pub param: f64,

    /// Follow the sampling decision of a remote parent when there is one.
    pub parent_based: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            kind: SamplerKind::Const,
            param: 1.0,
            parent_based: true,
        }
    }
}

/// Where finished spans are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// Finished spans are emitted as structured log events.
    #[default]
    Logging,
    /// Finished spans are printed by the OpenTelemetry stdout exporter.
    Stdout,
    /// No reporter; the tracer falls back to a no-op implementation.
    None,
}

/// Reporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReporterConfig {
    pub kind: ReporterKind,

    /// Export through a background batch processor instead of inline.
    pub batch: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            kind: ReporterKind::Logging,
            batch: false,
        }
    }
}
