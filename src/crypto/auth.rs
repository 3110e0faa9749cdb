//! HMAC-SHA256 payload authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::core::constants::{AUTH_SECRET_SIZE, MAX_SECURED_PAYLOAD, TAG_SIZE};
use crate::core::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Message authenticator holding the live HMAC secret.
///
/// Authentication always covers the plaintext secured span of a frame,
/// never the full frame. Secret material is zeroized on drop.
pub struct PayloadAuthenticator {
    secret: [u8; AUTH_SECRET_SIZE],
}

impl PayloadAuthenticator {
    /// Create an authenticator from a 32-byte secret.
    pub fn new(secret: &[u8; AUTH_SECRET_SIZE]) -> Self {
        Self { secret: *secret }
    }

    /// Compute the HMAC-SHA256 tag of a payload.
    pub fn generate(&self, payload: &[u8]) -> Result<[u8; TAG_SIZE], CryptoError> {
        if payload.len() > MAX_SECURED_PAYLOAD {
            return Err(CryptoError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_SECURED_PAYLOAD,
            });
        }
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("hmac accepts any key length");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().into())
    }

    /// Recompute the tag and compare against the received one.
    ///
    /// The comparison inspects every byte regardless of where a mismatch
    /// occurs, so timing reveals nothing about a tag prefix. Oversized
    /// payloads validate as false.
    pub fn validate(&self, payload: &[u8], tag: &[u8; TAG_SIZE]) -> bool {
        match self.generate(payload) {
            Ok(expected) => expected.as_slice().ct_eq(tag).into(),
            Err(_) => false,
        }
    }
}

impl Drop for PayloadAuthenticator {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [0x5E; 32];

    #[test]
    fn test_generate_validate_roundtrip() {
        let auth = PayloadAuthenticator::new(&SECRET);
        let payload = b"throttle and friends";
        let tag = auth.generate(payload).unwrap();
        assert!(auth.validate(payload, &tag));
    }

    #[test]
    fn test_tag_of_other_data_rejected() {
        let auth = PayloadAuthenticator::new(&SECRET);
        let tag = auth.generate(b"payload A").unwrap();
        assert!(!auth.validate(b"payload B", &tag));
    }

    #[test]
    fn test_single_byte_tag_difference_rejected() {
        let auth = PayloadAuthenticator::new(&SECRET);
        let payload = b"payload";
        let good = auth.generate(payload).unwrap();
        for i in 0..TAG_SIZE {
            let mut bad = good;
            bad[i] ^= 0x01;
            assert!(!auth.validate(payload, &bad), "tampered byte {i} accepted");
        }
    }

    #[test]
    fn test_different_secrets_different_tags() {
        let a = PayloadAuthenticator::new(&SECRET);
        let b = PayloadAuthenticator::new(&[0x6F; 32]);
        let payload = b"payload";
        assert_ne!(a.generate(payload).unwrap(), b.generate(payload).unwrap());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let auth = PayloadAuthenticator::new(&SECRET);
        let big = vec![0u8; MAX_SECURED_PAYLOAD + 1];
        assert!(matches!(
            auth.generate(&big),
            Err(CryptoError::PayloadTooLarge { .. })
        ));
        assert!(!auth.validate(&big, &[0u8; TAG_SIZE]));
    }

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256 with an all-zero 32-byte key over the empty message.
        let auth = PayloadAuthenticator::new(&[0u8; 32]);
        let tag = auth.generate(b"").unwrap();
        assert_eq!(
            hex::encode(tag),
            "b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad"
        );
    }
}
