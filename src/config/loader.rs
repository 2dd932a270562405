//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{EnvironmentName, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

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

/// Load configuration for the binary.
///
/// Reads `.env` from the working directory if present, then the optional
/// TOML file, then applies environment overrides and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_dotenv(None)?;

    let mut config = match path {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load variables from a `.env` file into the process environment.
///
/// With no path, `.env` is searched for from the working directory upwards.
/// A missing file is not an error; a malformed one is.
pub fn load_dotenv(path: Option<&Path>) -> Result<(), ConfigError> {
    let result = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Dotenv(e)),
    }
}

/// Parse a TOML file without environment overrides or validation.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Apply environment variable overrides using `lookup` to read variables.
///
/// | Variable | Field |
/// |---|---|
/// | `PORT` | `listener.port` |
/// | `HOST` | `listener.host` |
/// | `APP_ENV`, then `NODE_ENV` | `environment` |
/// | `LOG_LEVEL` | `observability.log_level` |
/// | `LOG_FORMAT` | `observability.log_format` |
/// | `SHUTDOWN_TIMEOUT_SECS` | `shutdown.drain_timeout_secs` |
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

    if let Some(port) = read("PORT") {
        config.listener.port = parse_var("PORT", &port)?;
    }

    if let Some(host) = read("HOST") {
        config.listener.host = host;
    }

    if let Some(env) = read("APP_ENV").or_else(|| read("NODE_ENV")) {
        config.environment = EnvironmentName(env);
    }

    if let Some(level) = read("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    if let Some(format) = read("LOG_FORMAT") {
        config.observability.log_format = Some(parse_var("LOG_FORMAT", &format)?);
    }

    if let Some(secs) = read("SHUTDOWN_TIMEOUT_SECS") {
        config.shutdown.drain_timeout_secs = parse_var("SHUTDOWN_TIMEOUT_SECS", &secs)?;
    }

    Ok(())
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
