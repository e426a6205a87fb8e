//! Startup orchestration.
//!
//! Turns a validated [`IntakeConfig`] into the immutable [`AppContext`]
//! every component reads from. Any missing or unusable secret is fatal
//! here, before a listener is bound.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audit::{sink_for, AuditRecorder, AuditSink, DenyList};
use crate::config::validation::validate_config;
use crate::config::{AuthConfig, ConfigError, IntakeConfig, ResolverKind};
use crate::intake::{InMemoryRecordStore, RecordStore};
use crate::security::token::parse_algorithm;
use crate::security::{
    FieldCipher, FixedIdentityResolver, IdentityResolver, KeyError, TokenCodec,
    TokenIdentityResolver,
};

/// A condition that prevents the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("encryption key is missing")]
    MissingEncryptionKey,

    #[error("encryption key is unusable: {0}")]
    Key(#[from] KeyError),

    #[error("token signing secret is missing")]
    MissingSigningSecret,

    #[error("unsupported token algorithm '{0}'")]
    UnsupportedAlgorithm(String),
}

/// Process-wide, read-only state built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub resolver: Arc<dyn IdentityResolver>,
    pub cipher: Arc<FieldCipher>,
    /// Present whenever a signing secret is configured.
    pub tokens: Option<Arc<TokenCodec>>,
    pub recorder: AuditRecorder,
    pub store: Arc<dyn RecordStore>,
}

impl AppContext {
    /// Validate `config` and build every component from it.
    pub fn from_config(config: &IntakeConfig) -> Result<Self, StartupError> {
        validate_config(config).map_err(|e| StartupError::Config(ConfigError::Validation(e)))?;

        let key = config
            .crypto
            .encryption_key
            .as_deref()
            .ok_or(StartupError::MissingEncryptionKey)?;
        let cipher = Arc::new(FieldCipher::from_base64(key)?);

        let tokens = token_codec(&config.auth)?.map(Arc::new);

        let resolver: Arc<dyn IdentityResolver> = match config.auth.resolver {
            ResolverKind::Fixed => {
                tracing::warn!(
                    id = config.auth.fixed_identity.id,
                    role = %config.auth.fixed_identity.role,
                    "Fixed identity resolver active; every caller is treated as this identity"
                );
                Arc::new(FixedIdentityResolver::from(&config.auth.fixed_identity))
            }
            ResolverKind::Token => {
                let codec = tokens.clone().ok_or(StartupError::MissingSigningSecret)?;
                Arc::new(TokenIdentityResolver::new(codec))
            }
        };

        let sink: Arc<dyn AuditSink> = Arc::from(sink_for(config.audit.sink));
        let recorder = AuditRecorder::new(DenyList::new(&config.audit.redact_keys), sink);

        tracing::info!(
            resolver = resolver.name(),
            audit_sink = ?config.audit.sink,
            redacted_keys = ?recorder.deny_list().keys().collect::<Vec<_>>(),
            "Application context initialized"
        );

        Ok(Self {
            resolver,
            cipher,
            tokens,
            recorder,
            store: Arc::new(InMemoryRecordStore::new()),
        })
    }

    /// Replace the record store.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the audit sink, keeping the configured deny-list.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.recorder = AuditRecorder::new(self.recorder.deny_list().clone(), sink);
        self
    }
}

/// Build the token codec from `auth`, if a signing secret is configured.
pub fn token_codec(auth: &AuthConfig) -> Result<Option<TokenCodec>, StartupError> {
    let secret = match auth.signing_secret.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    let algorithm = parse_algorithm(&auth.algorithm)
        .ok_or_else(|| StartupError::UnsupportedAlgorithm(auth.algorithm.clone()))?;

    Ok(Some(TokenCodec::new(
        secret.as_bytes(),
        algorithm,
        Duration::from_secs(auth.token_ttl_secs),
    )))
}
