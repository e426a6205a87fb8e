//! Field-level encryption for sensitive attributes.
//!
//! AES-256-GCM with a fresh random nonce per call. A field token is the
//! URL-safe base64 (unpadded) encoding of:
//!
//! ```text
//! version (1 byte) || nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! Decryption fails closed: any malformed, truncated, tampered or
//! foreign-key token is rejected with [`DecryptionError`].

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use thiserror::Error;

const TOKEN_VERSION: u8 = 0x01;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// The configured key could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("key is not valid base64")]
    Encoding,

    #[error("key must decode to {KEY_LEN} bytes, got {0}")]
    Length(usize),
}

/// Encryption of a field failed.
#[derive(Debug, Error)]
#[error("field encryption failed")]
pub struct EncryptionError;

/// A field token could not be turned back into plaintext.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64")]
    Encoding,

    #[error("unsupported ciphertext version {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("ciphertext is truncated")]
    Truncated,

    #[error("ciphertext failed authentication")]
    Authentication,

    #[error("decrypted value is not valid UTF-8")]
    Utf8,
}

/// Decode a base64 key (standard or URL-safe alphabet, padding optional).
pub fn decode_key(encoded: &str) -> Result<[u8; KEY_LEN], KeyError> {
    let normalized: String = encoded
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    let bytes = STANDARD_NO_PAD
        .decode(normalized)
        .map_err(|_| KeyError::Encoding)?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyError::Length(bytes.len()))
}

/// Generate a fresh random key, base64 encoded.
pub fn generate_key() -> String {
    let key = Aes256Gcm::generate_key(&mut OsRng);
    STANDARD.encode(key)
}

/// Reversible authenticated encryption of single string values.
///
/// Holds the process-wide key for its whole lifetime. The key never shows
/// up in `Debug` output.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Build a cipher from raw key bytes.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build a cipher from a base64 encoded key.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        Ok(Self::new(&decode_key(encoded)?))
    }

    /// Encrypt a plaintext value into a field token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| EncryptionError)?;

        let mut token = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&sealed);

        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Decrypt a field token produced by [`FieldCipher::encrypt`].
    pub fn decrypt(&self, token: &str) -> Result<String, DecryptionError> {
        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| DecryptionError::Encoding)?;

        let (&version, rest) = raw.split_first().ok_or(DecryptionError::Truncated)?;
        if version != TOKEN_VERSION {
            return Err(DecryptionError::UnsupportedVersion(version));
        }
        if rest.len() < NONCE_LEN + TAG_LEN {
            return Err(DecryptionError::Truncated);
        }

        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| DecryptionError::Authentication)?;

        String::from_utf8(plaintext).map_err(|_| DecryptionError::Utf8)
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
