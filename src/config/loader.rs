//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
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

fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration from an optional TOML file, apply `overrides`, then
/// validate the merged result.
///
/// Without a file the defaults are the starting point.
pub fn load_config(
    path: Option<&Path>,
    overrides: impl FnOnce(&mut RelayConfig),
) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };

    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("live-relay-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_valid_file() {
        let path = write_temp("valid.toml", "[upstream]\nport = 9000\n");
        let config = load_config(Some(path.as_path()), |_| {}).unwrap();
        assert_eq!(config.upstream.port, 9000);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn reports_validation_errors() {
        let path = write_temp("invalid.toml", "[proxy]\nport = 3001\n");
        let err = load_config(Some(path.as_path()), |_| {}).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("3001"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn reports_parse_errors() {
        let path = write_temp("broken.toml", "[upstream\nport = ");
        assert!(matches!(load_config(Some(path.as_path()), |_| {}), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/live-relay.toml")), |_| {}).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn overrides_apply_before_validation() {
        let path = write_temp("override.toml", "[proxy]\nport = 3001\n");
        let config = load_config(Some(path.as_path()), |config| config.proxy.port = 4000).unwrap();
        assert_eq!(config.proxy.port, 4000);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn no_file_starts_from_defaults() {
        let config = load_config(None, |_| {}).unwrap();
        assert_eq!(config.upstream.port, 8080);
    }
}
