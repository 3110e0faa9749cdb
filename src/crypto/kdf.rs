//! Password-based key derivation.
//!
//! PBKDF2 with HMAC-SHA256 stretches an operator-supplied pairing
//! password into a 32-byte pre-shared secret. The iteration floor keeps
//! offline guessing expensive; provisioning tools should go well above it.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::core::constants::{CIPHER_KEY_SIZE, KDF_SALT_SIZE, MIN_KDF_ITERATIONS};
use crate::core::error::CryptoError;

/// Derive a 32-byte key from a password and a 16-byte salt.
///
/// Rejects iteration counts below [`MIN_KDF_ITERATIONS`].
pub fn derive_key(
    password: &[u8],
    salt: &[u8; KDF_SALT_SIZE],
    iterations: u32,
) -> Result<[u8; CIPHER_KEY_SIZE], CryptoError> {
    if iterations < MIN_KDF_ITERATIONS {
        return Err(CryptoError::WeakIterations(iterations));
    }
    let mut key = [0u8; CIPHER_KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_deterministic() {
        let salt = [0x01; KDF_SALT_SIZE];
        let a = derive_key(b"correct horse", &salt, 10_000).unwrap();
        let b = derive_key(b"correct horse", &salt, 10_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_changes_key() {
        let a = derive_key(b"password", &[0x01; KDF_SALT_SIZE], 10_000).unwrap();
        let b = derive_key(b"password", &[0x02; KDF_SALT_SIZE], 10_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_changes_key() {
        let salt = [0x01; KDF_SALT_SIZE];
        let a = derive_key(b"password one", &salt, 10_000).unwrap();
        let b = derive_key(b"password two", &salt, 10_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_weak_iteration_count_rejected() {
        let salt = [0x01; KDF_SALT_SIZE];
        assert_eq!(
            derive_key(b"password", &salt, 9_999),
            Err(CryptoError::WeakIterations(9_999))
        );
        assert!(derive_key(b"password", &salt, 10_000).is_ok());
    }
}
