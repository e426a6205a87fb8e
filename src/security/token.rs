//! Signed access tokens.
//!
//! Tokens are HMAC-signed JWTs carrying the caller id (`sub`), role, issue
//! time and an absolute expiry, so a verifier can reject stale tokens
//! without external state.

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::security::identity::{AuthenticationError, CallerIdentity};

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller id, as a decimal string.
    pub sub: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

/// Token issuance failed.
#[derive(Debug, Error)]
#[error("failed to issue token: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

/// Map a configured algorithm name to an HMAC algorithm.
pub fn parse_algorithm(name: &str) -> Option<Algorithm> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Some(Algorithm::HS256),
        "HS384" => Some(Algorithm::HS384),
        "HS512" => Some(Algorithm::HS512),
        _ => None,
    }
}

/// Issues and verifies access tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            default_ttl,
        }
    }

    /// Lifetime applied by [`TokenCodec::issue_default`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `identity` that expires `ttl` from now.
    pub fn issue(&self, identity: &CallerIdentity, ttl: Duration) -> Result<String, TokenError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: identity.id.to_string(),
            role: identity.role.clone(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        };
        self.sign(&claims)
    }

    /// Issue a token with the configured lifetime.
    pub fn issue_default(&self, identity: &CallerIdentity) -> Result<String, TokenError> {
        self.issue(identity, self.default_ttl)
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(encode(&Header::new(self.algorithm), claims, &self.encoding)?)
    }

    /// Verify signature and expiry, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Result<CallerIdentity, AuthenticationError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthenticationError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::ImmatureSignature => AuthenticationError::InvalidToken,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => {
                    AuthenticationError::InvalidClaims
                }
                _ => AuthenticationError::MalformedCredentials,
            }
        })?;

        let id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthenticationError::InvalidClaims)?;

        Ok(CallerIdentity {
            id,
            role: data.claims.role,
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
