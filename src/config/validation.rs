//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. Every problem is
//! collected so an operator sees the whole list in one startup attempt.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{IntakeConfig, ResolverKind};
use crate::security::cipher::decode_key;
use crate::security::token::parse_algorithm;

/// A single semantic problem with the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("crypto.encryption_key is required")]
    MissingEncryptionKey,

    #[error("crypto.encryption_key is invalid: {0}")]
    InvalidEncryptionKey(String),

    #[error("auth.signing_secret is required when auth.resolver = \"token\"")]
    MissingSigningSecret,

    #[error("auth.algorithm '{0}' is not supported (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("auth.token_ttl_secs must be greater than zero")]
    ZeroTokenTtl,

    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration. Pure: `IntakeConfig → Result<(), Vec<ValidationError>>`.
pub fn validate_config(config: &IntakeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.crypto.encryption_key.as_deref() {
        None | Some("") => errors.push(ValidationError::MissingEncryptionKey),
        Some(encoded) => {
            if let Err(e) = decode_key(encoded) {
                errors.push(ValidationError::InvalidEncryptionKey(e.to_string()));
            }
        }
    }

    if config.auth.resolver == ResolverKind::Token
        && config.auth.signing_secret.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingSigningSecret);
    }

    if parse_algorithm(&config.auth.algorithm).is_none() {
        errors.push(ValidationError::UnsupportedAlgorithm(
            config.auth.algorithm.clone(),
        ));
    }

    if config.auth.token_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTokenTtl);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
