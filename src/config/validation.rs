//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges, known names and,
//! when `tracer.validate` is set, unknown keys in the `[tracer]` table.
//! All errors are collected rather than stopping at the first.

use std::fmt;

use crate::config::schema::{AppConfig, SamplerKind};

/// Propagator names understood by the tracer service.
pub const KNOWN_PROPAGATORS: &[&str] = &["jaeger", "tracecontext"];

const TRACER_KEYS: &[&str] = &[
    "enabled",
    "service_name",
    "validate",
    "propagators",
    "sampler",
    "reporter",
];
const SAMPLER_KEYS: &[&str] = &["type", "param", "parent_based"];
const REPORTER_KEYS: &[&str] = &["kind", "batch"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    UnknownKey(String),
    EmptyServiceName,
    UnknownPropagator(String),
    NoPropagators,
    SamplerParam { kind: SamplerKind, param: f64 },
    InvalidBindAddress(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownKey(key) => write!(f, "unknown tracer option `{}`", key),
            ValidationError::EmptyServiceName => write!(f, "tracer.service_name must not be empty"),
            ValidationError::UnknownPropagator(name) => {
                write!(f, "unknown propagator `{}` (expected one of {:?})", name, KNOWN_PROPAGATORS)
            }
            ValidationError::NoPropagators => write!(f, "tracer.propagators must not be empty"),
            ValidationError::SamplerParam { kind, param } => {
                write!(f, "sampler param {} is out of range for {:?} sampler", param, kind)
            }
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "server.bind_address `{}` is not a socket address", addr)
            }
        }
    }
}

/// Check semantic constraints on a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.server.bind_address.clone(),
        ));
    }

    let tracer = &config.tracer;
    if tracer.service_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    if tracer.propagators.is_empty() {
        errors.push(ValidationError::NoPropagators);
    }
    for name in &tracer.propagators {
        if !KNOWN_PROPAGATORS.contains(&name.as_str()) {
            errors.push(ValidationError::UnknownPropagator(name.clone()));
        }
    }

    let sampler = &tracer.sampler;
    let param_ok = match sampler.kind {
        SamplerKind::Const => sampler.param == 0.0 || sampler.param == 1.0,
        SamplerKind::Probabilistic => (0.0..=1.0).contains(&sampler.param),
    };
    if !param_ok {
        errors.push(ValidationError::SamplerParam {
            kind: sampler.kind,
            param: sampler.param,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report keys under `[tracer]` (and its sub-tables) that the schema does not know.
///
/// Serde silently ignores unknown fields, which hides typos such as
/// `sample` for `sampler`.
pub fn unknown_tracer_keys(raw: &toml::Table) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(tracer) = raw.get("tracer").and_then(toml::Value::as_table) else {
        return errors;
    };

    collect_unknown(tracer, TRACER_KEYS, "tracer", &mut errors);
    for (section, known) in [("sampler", SAMPLER_KEYS), ("reporter", REPORTER_KEYS)] {
        if let Some(table) = tracer.get(section).and_then(toml::Value::as_table) {
            collect_unknown(table, known, &format!("tracer.{}", section), &mut errors);
        }
    }
    errors
}

fn collect_unknown(
    table: &toml::Table,
    known: &[&str],
    prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(ValidationError::UnknownKey(format!("{}.{}", prefix, key)));
        }
    }
}
