//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{BrowserCatalog, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

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

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a server configuration without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Parse a browser catalog.
pub fn parse_browsers(content: &str) -> Result<BrowserCatalog, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load the server file, merge an optional browser catalog into it, then
/// validate the result as a whole.
pub fn load_all(config_path: &Path, browsers_path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = parse_config(&read(config_path)?)?;

    if let Some(path) = browsers_path {
        let catalog = parse_browsers(&read(path)?)?;
        config.browsers.extend(catalog.browsers);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
