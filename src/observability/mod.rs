//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     LoggingConfig → logging.rs (global tracing subscriber)
//!     TracerConfig  → tracer.rs (provider, sampler, propagators)
//!
//! per request (see crate::http):
//!     span started on TracerService → finished → provider
//!     → exporter.rs (structured log event) or stdout exporter
//! ```
//!
//! # Design Decisions
//! - Log output and span export are separate pipelines; the logging
//!   reporter bridges spans into logs when no collector is available
//! - The tracer is never global state; it is passed explicitly

pub mod exporter;
pub mod logging;
pub mod tracer;

pub use logging::init_logging;
pub use tracer::{TracerService, TracingError};
