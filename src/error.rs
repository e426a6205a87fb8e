//! Request-time error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::intake::store::StoreError;
use crate::security::{AuthenticationError, AuthorizationError, DecryptionError, EncryptionError};

/// Everything that can fail while serving a request.
///
/// The `Display` text is for server logs. Clients get
/// [`IntakeError::public_message`] and the status code only.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error("field decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("record store failed: {0}")]
    Store(#[from] StoreError),
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::Encryption(_) | Self::Decryption(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Body text safe to show a client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "unauthorized",
            Self::Authorization(_) => "forbidden",
            Self::Encryption(_) | Self::Decryption(_) | Self::Store(_) => "internal error",
        }
    }
}
