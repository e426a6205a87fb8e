//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the intake
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the intake service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct IntakeConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Identity resolution and token settings.
    pub auth: AuthConfig,

    /// Field encryption settings.
    pub crypto: CryptoConfig,

    /// Audit recorder settings.
    pub audit: AuditConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Which identity resolver the service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Every request resolves to `auth.fixed_identity`. Opt-in only.
    Fixed,
    /// Requests must carry a valid signed bearer token.
    #[default]
    Token,
}

impl std::str::FromStr for ResolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "token" => Ok(Self::Token),
            other => Err(format!("unknown resolver '{}'", other)),
        }
    }
}

/// Authentication configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity resolution strategy.
    pub resolver: ResolverKind,

    /// HMAC secret used to sign and verify access tokens.
    pub signing_secret: Option<String>,

    /// Token algorithm identifier (HS256, HS384, HS512).
    pub algorithm: String,

    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: u64,

    /// Identity returned by the fixed resolver.
    pub fixed_identity: FixedIdentityConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::Token,
            signing_secret: None,
            algorithm: "HS256".to_string(),
            token_ttl_secs: 30 * 60,
            fixed_identity: FixedIdentityConfig::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("resolver", &self.resolver)
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("algorithm", &self.algorithm)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("fixed_identity", &self.fixed_identity)
            .finish()
    }
}

/// Identity used by the fixed resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FixedIdentityConfig {
    pub id: i64,
    pub role: String,
}

impl Default for FixedIdentityConfig {
    fn default() -> Self {
        Self {
            id: 1,
            role: "CaseWorker".to_string(),
        }
    }
}

/// Field encryption configuration.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CryptoConfig {
    /// Base64-encoded 32-byte AES-256-GCM key. Required; there is no fallback.
    pub encryption_key: Option<String>,
}

impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig")
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Where redacted audit records are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// Structured `tracing` event on the `audit` target.
    #[default]
    Tracing,
    /// One JSON line per record on stdout.
    Stdout,
}

/// Audit recorder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Emission target.
    pub sink: AuditSinkKind,

    /// Keys whose values are replaced before emission. `ssn` is always added.
    pub redact_keys: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::Tracing,
            redact_keys: vec!["ssn".to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
