//! Caller identity resolution.
//!
//! An [`IdentityResolver`] turns request credentials into a
//! [`CallerIdentity`]. The strategy is picked once at startup from
//! `auth.resolver`; handlers never branch on it.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FixedIdentityConfig;
use crate::security::token::TokenCodec;

/// Who is calling. Built fresh per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: i64,
    pub role: String,
}

impl CallerIdentity {
    pub fn new(id: i64, role: impl Into<String>) -> Self {
        Self {
            id,
            role: role.into(),
        }
    }
}

/// The caller could not be identified.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("missing bearer credentials")]
    MissingCredentials,

    #[error("malformed bearer credentials")]
    MalformedCredentials,

    #[error("token signature or algorithm is invalid")]
    InvalidToken,

    #[error("token has expired")]
    Expired,

    #[error("token claims are invalid")]
    InvalidClaims,
}

impl AuthenticationError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing",
            Self::MalformedCredentials => "malformed",
            Self::InvalidToken => "invalid",
            Self::Expired => "expired",
            Self::InvalidClaims => "claims",
        }
    }
}

/// Strategy for resolving the caller of a request.
pub trait IdentityResolver: Send + Sync {
    /// Resolve the caller from request headers.
    fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity, AuthenticationError>;

    /// Name used in startup logs.
    fn name(&self) -> &'static str;
}

/// Resolves every request to the same identity. For demos and tests.
#[derive(Debug, Clone)]
pub struct FixedIdentityResolver {
    identity: CallerIdentity,
}

impl FixedIdentityResolver {
    pub fn new(identity: CallerIdentity) -> Self {
        Self { identity }
    }
}

impl From<&FixedIdentityConfig> for FixedIdentityResolver {
    fn from(config: &FixedIdentityConfig) -> Self {
        Self::new(CallerIdentity {
            id: config.id,
            role: config.role.clone(),
        })
    }
}

impl IdentityResolver for FixedIdentityResolver {
    fn resolve(&self, _headers: &HeaderMap) -> Result<CallerIdentity, AuthenticationError> {
        Ok(self.identity.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Resolves callers from a signed `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct TokenIdentityResolver {
    codec: Arc<TokenCodec>,
}

impl TokenIdentityResolver {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl IdentityResolver for TokenIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity, AuthenticationError> {
        let token = bearer_token(headers)?;
        self.codec.verify(token)
    }

    fn name(&self) -> &'static str {
        "token"
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthenticationError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthenticationError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthenticationError::MalformedCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthenticationError::MalformedCredentials)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthenticationError::MalformedCredentials);
    }
    Ok(token)
}
