//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid PORT env var: {0}")]
    InvalidPort(String),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply a `PORT` value (if any) to the listener address, keeping its host.
pub fn apply_port_override(
    config: &mut ServerConfig,
    port: Option<&str>,
) -> Result<(), ConfigError> {
    let Some(raw) = port else {
        return Ok(());
    };

    let port: u16 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;

    config.listener.bind_address = with_port(&config.listener.bind_address, port);
    Ok(())
}

fn with_port(address: &str, port: u16) -> String {
    let host = address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or(address);
    format!("{}:{}", host, port)
}

/// Read `PORT` from the process environment and apply it.
pub fn apply_env_overrides(config: &mut ServerConfig) -> Result<(), ConfigError> {
    let port = std::env::var(PORT_ENV).ok();
    apply_port_override(config, port.as_deref())
}
