//! Cryptographic suite for the command link.
//!
//! The suite is fixed, with no negotiation:
//! - AES-256-CTR payload encryption ([`cipher`])
//! - HMAC-SHA256 message authentication ([`auth`])
//! - PBKDF2-HMAC-SHA256 password-based key derivation ([`kdf`])
//! - Ephemeral ECDH on NIST P-256 for session establishment ([`exchange`])

pub mod auth;
pub mod cipher;
pub mod exchange;
pub mod kdf;

pub use auth::PayloadAuthenticator;
pub use cipher::PayloadCipher;
pub use exchange::{ExchangeState, KeyExchange};
pub use kdf::derive_key;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::{AUTH_SECRET_SIZE, CIPHER_KEY_SIZE, SHARED_SECRET_SIZE};

/// A 32-byte shared secret produced by key exchange or provisioning.
///
/// Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Expose the raw secret bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<32 bytes>)")
    }
}

/// The live AES key and HMAC secret protecting the link.
///
/// Replaced only as a whole: the cipher and authenticator must never see
/// a key pair from two different sessions. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    cipher_key: [u8; CIPHER_KEY_SIZE],
    auth_secret: [u8; AUTH_SECRET_SIZE],
}

impl SessionKeys {
    /// Build session keys from distinct cipher and authentication material.
    pub fn from_parts(
        cipher_key: [u8; CIPHER_KEY_SIZE],
        auth_secret: [u8; AUTH_SECRET_SIZE],
    ) -> Self {
        Self {
            cipher_key,
            auth_secret,
        }
    }

    /// Derive both keys from one shared secret.
    ///
    /// The paired device applies the same rule, so both ends of the link
    /// converge on identical cipher and authentication keys.
    pub fn from_shared_secret(secret: &SharedSecret) -> Self {
        Self {
            cipher_key: *secret.as_bytes(),
            auth_secret: *secret.as_bytes(),
        }
    }

    /// The AES-256 key.
    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_SIZE] {
        &self.cipher_key
    }

    /// The HMAC secret.
    pub fn auth_secret(&self) -> &[u8; AUTH_SECRET_SIZE] {
        &self.auth_secret
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKeys(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keys_from_shared_secret() {
        let secret = SharedSecret::from_bytes([0x11; 32]);
        let keys = SessionKeys::from_shared_secret(&secret);
        assert_eq!(keys.cipher_key(), secret.as_bytes());
        assert_eq!(keys.auth_secret(), secret.as_bytes());
    }

    #[test]
    fn test_debug_output_redacted() {
        let keys = SessionKeys::from_parts([1; 32], [2; 32]);
        assert_eq!(format!("{keys:?}"), "SessionKeys(<redacted>)");
    }
}
