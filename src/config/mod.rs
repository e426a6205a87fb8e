//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (SECRET_KEY, ENCRYPTION_KEY, INTAKE_*)
//!     → validation.rs (semantic checks)
//!     → IntakeConfig (validated, immutable)
//!     → lifecycle::startup builds the AppContext from it
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start and never mutated
//! - All fields have defaults to allow minimal configs, except key material
//! - Missing key material fails startup instead of falling back to a default

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, load_with_env, read_config_file, ConfigError};
pub use schema::{
    AuditConfig, AuditSinkKind, AuthConfig, CryptoConfig, FixedIdentityConfig, IntakeConfig,
    ListenerConfig, ObservabilityConfig, ResolverKind, SecurityConfig, TimeoutConfig, TlsConfig,
};
pub use validation::ValidationError;
