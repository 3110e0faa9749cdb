//! Ephemeral ECDH key exchange on NIST P-256.
//!
//! Two-message handshake: the initiator sends its public point, the
//! responder answers with its own, and both sides derive the same 32-byte
//! secret (the raw x-coordinate of the shared point) without ever
//! transmitting it. Public points travel as raw X || Y with the SEC1
//! uncompressed marker stripped.
//!
//! The handshake carries no peer-identity proof: it defeats passive
//! eavesdropping but not an active man-in-the-middle substituting keys.

use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::generic_array::GenericArray;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, PublicKey};
use rand::rngs::OsRng;
use tracing::{debug, warn};

use crate::core::constants::{PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE};
use crate::core::error::ExchangeError;

use super::SharedSecret;

/// Key-exchange session state.
///
/// `Failed` is sticky: only [`KeyExchange::reset`] leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// No exchange in progress.
    Idle,
    /// Generating the ephemeral key pair.
    GeneratingKeys,
    /// Own key pair ready; waiting for the peer's public point.
    AwaitingPeerKey,
    /// Running ECDH against the peer's point.
    ComputingSecret,
    /// Shared secret derived and available.
    Established,
    /// A cryptographic step failed; reset required.
    Failed,
}

/// ECDH key-exchange engine owning one ephemeral session at a time.
///
/// Every new handshake attempt starts with [`reset`](Self::reset), which
/// wipes the previous secret and key pair.
pub struct KeyExchange {
    state: ExchangeState,
    ephemeral: Option<EphemeralSecret>,
    shared: Option<SharedSecret>,
}

impl KeyExchange {
    /// Create an idle exchange engine.
    pub fn new() -> Self {
        Self {
            state: ExchangeState::Idle,
            ephemeral: None,
            shared: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// True once a shared secret has been derived.
    pub fn is_established(&self) -> bool {
        self.state == ExchangeState::Established
    }

    /// Abandon the session: wipe the secret and key pair, return to idle.
    pub fn reset(&mut self) {
        self.ephemeral = None;
        self.shared = None; // SharedSecret zeroizes on drop
        self.state = ExchangeState::Idle;
    }

    /// Generate a fresh ephemeral P-256 key pair.
    pub fn generate_key_pair(&mut self) -> Result<(), ExchangeError> {
        if self.state == ExchangeState::Failed {
            return Err(ExchangeError::Failed);
        }
        self.state = ExchangeState::GeneratingKeys;
        self.ephemeral = Some(EphemeralSecret::random(&mut OsRng));
        self.state = ExchangeState::AwaitingPeerKey;
        Ok(())
    }

    /// Export the own public point as raw X || Y.
    pub fn public_key(&self) -> Result<[u8; PUBLIC_KEY_SIZE], ExchangeError> {
        let ephemeral = self.ephemeral.as_ref().ok_or(ExchangeError::NotReady)?;
        let point = ephemeral.public_key().to_encoded_point(false);
        let mut raw = [0u8; PUBLIC_KEY_SIZE];
        // Skip the 0x04 uncompressed-point marker.
        raw.copy_from_slice(&point.as_bytes()[1..]);
        Ok(raw)
    }

    /// Run ECDH against the peer's raw public point.
    ///
    /// Invalid or off-curve points fail closed: the session moves to
    /// `Failed` and no secret is kept.
    pub fn compute_shared_secret(
        &mut self,
        peer_public: &[u8; PUBLIC_KEY_SIZE],
    ) -> Result<(), ExchangeError> {
        if self.state == ExchangeState::Failed {
            return Err(ExchangeError::Failed);
        }
        let Some(ephemeral) = self.ephemeral.as_ref() else {
            return Err(ExchangeError::NotReady);
        };
        self.state = ExchangeState::ComputingSecret;

        // Re-tag the raw X || Y point before import; the curve check
        // happens inside the decode.
        let point = EncodedPoint::from_untagged_bytes(GenericArray::from_slice(peer_public));
        let Some(peer) = Option::<PublicKey>::from(PublicKey::from_encoded_point(&point)) else {
            warn!("key exchange rejected invalid peer public key");
            self.state = ExchangeState::Failed;
            return Err(ExchangeError::InvalidPeerKey);
        };

        let ecdh = ephemeral.diffie_hellman(&peer);
        let mut secret = [0u8; SHARED_SECRET_SIZE];
        secret.copy_from_slice(ecdh.raw_secret_bytes());
        self.shared = Some(SharedSecret::from_bytes(secret));
        self.state = ExchangeState::Established;
        debug!("key exchange established");
        Ok(())
    }

    /// The derived shared secret, once established.
    pub fn shared_secret(&self) -> Option<&SharedSecret> {
        match self.state {
            ExchangeState::Established => self.shared.as_ref(),
            _ => None,
        }
    }
}

impl Default for KeyExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_derive_identical_secret() {
        let mut alice = KeyExchange::new();
        let mut bob = KeyExchange::new();

        alice.generate_key_pair().unwrap();
        bob.generate_key_pair().unwrap();

        let alice_pub = alice.public_key().unwrap();
        let bob_pub = bob.public_key().unwrap();

        alice.compute_shared_secret(&bob_pub).unwrap();
        bob.compute_shared_secret(&alice_pub).unwrap();

        assert!(alice.is_established());
        assert!(bob.is_established());
        assert_eq!(
            alice.shared_secret().unwrap().as_bytes(),
            bob.shared_secret().unwrap().as_bytes()
        );
    }

    #[test]
    fn test_state_progression() {
        let mut kx = KeyExchange::new();
        assert_eq!(kx.state(), ExchangeState::Idle);

        kx.generate_key_pair().unwrap();
        assert_eq!(kx.state(), ExchangeState::AwaitingPeerKey);

        let mut peer = KeyExchange::new();
        peer.generate_key_pair().unwrap();
        kx.compute_shared_secret(&peer.public_key().unwrap()).unwrap();
        assert_eq!(kx.state(), ExchangeState::Established);
    }

    #[test]
    fn test_public_key_before_generation_fails() {
        let kx = KeyExchange::new();
        assert_eq!(kx.public_key(), Err(ExchangeError::NotReady));
    }

    #[test]
    fn test_compute_without_own_keys_fails() {
        let mut kx = KeyExchange::new();
        assert_eq!(
            kx.compute_shared_secret(&[0x01; PUBLIC_KEY_SIZE]),
            Err(ExchangeError::NotReady)
        );
    }

    #[test]
    fn test_off_curve_peer_key_fails_closed() {
        let mut kx = KeyExchange::new();
        kx.generate_key_pair().unwrap();

        let err = kx.compute_shared_secret(&[0x01; PUBLIC_KEY_SIZE]).unwrap_err();
        assert_eq!(err, ExchangeError::InvalidPeerKey);
        assert_eq!(kx.state(), ExchangeState::Failed);
        assert!(kx.shared_secret().is_none());

        // Failed is sticky until reset.
        assert_eq!(kx.generate_key_pair(), Err(ExchangeError::Failed));
        kx.reset();
        assert_eq!(kx.state(), ExchangeState::Idle);
        kx.generate_key_pair().unwrap();
    }

    #[test]
    fn test_reset_wipes_secret() {
        let mut kx = KeyExchange::new();
        let mut peer = KeyExchange::new();
        kx.generate_key_pair().unwrap();
        peer.generate_key_pair().unwrap();
        kx.compute_shared_secret(&peer.public_key().unwrap()).unwrap();
        assert!(kx.shared_secret().is_some());

        kx.reset();
        assert!(kx.shared_secret().is_none());
        assert_eq!(kx.state(), ExchangeState::Idle);
    }

    #[test]
    fn test_fresh_sessions_fresh_secrets() {
        let secret_pair = || {
            let mut a = KeyExchange::new();
            let mut b = KeyExchange::new();
            a.generate_key_pair().unwrap();
            b.generate_key_pair().unwrap();
            a.compute_shared_secret(&b.public_key().unwrap()).unwrap();
            *a.shared_secret().unwrap().as_bytes()
        };
        assert_ne!(secret_pair(), secret_pair());
    }
}
