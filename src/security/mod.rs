//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request to a protected route:
//!     → identity.rs (IdentityResolver: fixed or bearer token via token.rs)
//!     → access.rs (authorize against the route's RoleRequirement)
//!     → handler receives CallerIdentity
//!
//! Sensitive fields before persistence:
//!     → cipher.rs (AES-256-GCM field tokens)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any credential, role or ciphertext problem
//! - Key material and secrets are loaded once and never logged
//! - Client-visible errors carry no role lists or key details

pub mod access;
pub mod cipher;
pub mod identity;
pub mod token;

pub use access::{access_guard, authorize, AccessGuard, AuthorizationError, RoleRequirement};
pub use cipher::{DecryptionError, EncryptionError, FieldCipher, KeyError};
pub use identity::{
    AuthenticationError, CallerIdentity, FixedIdentityResolver, IdentityResolver,
    TokenIdentityResolver,
};
pub use token::{Claims, TokenCodec, TokenError};
