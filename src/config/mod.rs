//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (unknown keys, semantic checks)
//!     → AppConfig (validated, immutable)
//!     → TracerConfig handed to TracerService::init once at startup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, override_bind_address, parse_config, ConfigError};
pub use schema::{
    AppConfig, LogFormat, LoggingConfig, ReporterConfig, ReporterKind, SamplerConfig,
    SamplerKind, ServerConfig, TracerConfig,
};
