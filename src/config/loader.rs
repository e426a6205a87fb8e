//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::IntakeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the token signing secret.
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
/// Environment variable holding the base64 field encryption key.
pub const ENV_ENCRYPTION_KEY: &str = "ENCRYPTION_KEY";
pub const ENV_BIND_ADDRESS: &str = "INTAKE_BIND_ADDRESS";
pub const ENV_AUTH_RESOLVER: &str = "INTAKE_AUTH_RESOLVER";
pub const ENV_TOKEN_TTL_SECS: &str = "INTAKE_TOKEN_TTL_SECS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

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
pub fn load_config(path: &Path) -> Result<IntakeConfig, ConfigError> {
    let config = read_config_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_with_env(path: Option<&Path>) -> Result<IntakeConfig, ConfigError> {
    let mut config = match path {
        Some(p) => read_config_file(p)?,
        None => IntakeConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn read_config_file(path: &Path) -> Result<IntakeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts the environment so tests don't mutate process state.
pub fn apply_env_overrides<F>(config: &mut IntakeConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(secret) = lookup(ENV_SECRET_KEY) {
        config.auth.signing_secret = Some(secret);
    }
    if let Some(key) = lookup(ENV_ENCRYPTION_KEY) {
        config.crypto.encryption_key = Some(key);
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(resolver) = lookup(ENV_AUTH_RESOLVER) {
        config.auth.resolver = resolver.parse().map_err(|reason| ConfigError::Env {
            name: ENV_AUTH_RESOLVER,
            reason,
        })?;
    }
    if let Some(ttl) = lookup(ENV_TOKEN_TTL_SECS) {
        config.auth.token_ttl_secs = ttl.parse().map_err(|e| ConfigError::Env {
            name: ENV_TOKEN_TTL_SECS,
            reason: format!("{}", e),
        })?;
    }
    Ok(())
}
