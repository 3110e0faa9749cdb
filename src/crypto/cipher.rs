//! AES-256-CTR payload encryption.
//!
//! CTR mode turns AES into a stream cipher: the 16-byte nonce is the
//! initial big-endian counter block, and decryption is the same keystream
//! XOR as encryption. A nonce must never be reused under one key for two
//! different payloads; the pipeline generates a fresh one per frame.

use aes::Aes256;
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::core::constants::{CIPHER_KEY_SIZE, MAX_SECURED_PAYLOAD, NONCE_SIZE};
use crate::core::error::CryptoError;

type Aes256Ctr = Ctr128BE<Aes256>;

/// Symmetric payload cipher holding the live AES-256 key.
///
/// Key material is zeroized on drop.
pub struct PayloadCipher {
    key: [u8; CIPHER_KEY_SIZE],
}

impl PayloadCipher {
    /// Create a cipher from a 32-byte key.
    pub fn new(key: &[u8; CIPHER_KEY_SIZE]) -> Self {
        Self { key: *key }
    }

    /// Draw a fresh 16-byte nonce from the OS CSPRNG.
    ///
    /// Fails if the generator cannot produce bytes; the output buffer is
    /// not partially written on failure.
    pub fn generate_nonce(&self) -> Result<[u8; NONCE_SIZE], CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|_| CryptoError::Rng)?;
        Ok(nonce)
    }

    /// Encrypt a payload in place under the given nonce.
    ///
    /// Payloads longer than [`MAX_SECURED_PAYLOAD`] are rejected, never
    /// truncated, and the buffer is left untouched.
    pub fn encrypt(
        &self,
        payload: &mut [u8],
        nonce: &[u8; NONCE_SIZE],
    ) -> Result<(), CryptoError> {
        if payload.len() > MAX_SECURED_PAYLOAD {
            return Err(CryptoError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_SECURED_PAYLOAD,
            });
        }
        let mut cipher = Aes256Ctr::new(&self.key.into(), &(*nonce).into());
        cipher.apply_keystream(payload);
        Ok(())
    }

    /// Decrypt a payload in place under the given nonce.
    ///
    /// CTR mode is self-inverse, so this is encryption applied to the
    /// ciphertext.
    pub fn decrypt(
        &self,
        payload: &mut [u8],
        nonce: &[u8; NONCE_SIZE],
    ) -> Result<(), CryptoError> {
        self.encrypt(payload, nonce)
    }
}

impl Drop for PayloadCipher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}
