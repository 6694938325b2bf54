//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{unknown_tracer_keys, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let raw: toml::Table = toml::from_str(content)?;
    let config: AppConfig = toml::Value::Table(raw.clone()).try_into()?;

    let mut errors = Vec::new();
    if config.tracer.validate {
        errors.extend(unknown_tracer_keys(&raw));
    }
    if let Err(semantic) = validate_config(&config) {
        errors.extend(semantic);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Replace `server.bind_address` and re-run semantic validation.
pub fn override_bind_address(
    mut config: AppConfig,
    bind_address: String,
) -> Result<AppConfig, ConfigError> {
    config.server.bind_address = bind_address;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_override_is_validated() {
        let config = override_bind_address(AppConfig::default(), "127.0.0.1:9000".into()).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");

        let err = override_bind_address(AppConfig::default(), "not-an-address".into()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![ValidationError::InvalidBindAddress("not-an-address".into())]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
    use crate::config::schema::{LogFormat, ReporterKind, SamplerKind};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.tracer.propagators, vec!["jaeger".to_string()]);
        assert!(config.tracer.validate);
    }

    #[test]
    fn parses_full_tracer_section() {
        let config = parse_config(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [tracer]
            service_name = "orders"
            propagators = ["jaeger", "tracecontext"]

            [tracer.sampler]
            type = "probabilistic"
            param = 0.25
            parent_based = false

            [tracer.reporter]
            kind = "stdout"
            batch = true
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.tracer.service_name, "orders");
        assert_eq!(config.tracer.sampler.kind, SamplerKind::Probabilistic);
        assert_eq!(config.tracer.sampler.param, 0.25);
        assert!(!config.tracer.sampler.parent_based);
        assert_eq!(config.tracer.reporter.kind, ReporterKind::Stdout);
        assert!(config.tracer.reporter.batch);
    }

    #[test]
    fn unknown_keys_rejected_when_validating() {
        let err = parse_config("[tracer]\nservice_nmae = \"x\"").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(
                    errors,
                    vec![ValidationError::UnknownKey("tracer.service_nmae".into())]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_tolerated_without_validation() {
        let config = parse_config("[tracer]\nvalidate = false\nservice_nmae = \"x\"").unwrap();
        assert_eq!(config.tracer.service_name, "trace-interceptor");
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        assert!(matches!(
            parse_config("[tracer\nservice_name = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracer.toml");
        fs::write(&path, "[tracer]\nservice_name = \"billing\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.tracer.service_name, "billing");

        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
