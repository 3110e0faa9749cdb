//! Error types for the ROVELINK engine.

use thiserror::Error;

/// Structural defects found while decoding or validating a frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer length matches no known frame layout.
    #[error("unrecognized frame length: {0} bytes")]
    UnknownLength(usize),

    /// Encryption flag disagrees with the presence of nonce/tag fields.
    #[error("encryption flag inconsistent with frame length")]
    SecurityMismatch,

    /// Stored checksum does not match the recomputed one.
    #[error("checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum carried by the frame.
        stored: u16,
        /// Checksum recomputed over the frame bytes.
        computed: u16,
    },

    /// Protocol version differs from the engine's compiled version.
    #[error("protocol version mismatch: expected {expected:#04x}, got {actual:#04x}")]
    VersionMismatch {
        /// Version this engine speaks.
        expected: u8,
        /// Version carried by the frame.
        actual: u8,
    },

    /// Vehicle-type tag outside the four defined types (strict mode).
    #[error("unknown vehicle type tag: {0}")]
    UnknownVehicle(u8),

    /// Handshake message-type tag is neither init nor response.
    #[error("unknown handshake kind: {0}")]
    UnknownHandshakeKind(u8),
}

/// Errors in the symmetric crypto layer (cipher, authenticator, KDF).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Payload exceeds the secured-payload bound.
    #[error("payload too large: {len} > {max} bytes")]
    PayloadTooLarge {
        /// Offered payload length.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The OS random generator failed to produce bytes.
    #[error("random generator failure")]
    Rng,

    /// PBKDF2 iteration count below the accepted minimum.
    #[error("too few KDF iterations: {0} < 10000")]
    WeakIterations(u32),

    /// Operation requires session keys that have not been installed.
    #[error("session keys not installed")]
    NotInitialized,
}

/// Errors in the key-exchange engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeError {
    /// Peer public key is not a valid point on P-256.
    #[error("invalid or off-curve peer public key")]
    InvalidPeerKey,

    /// Operation is not legal in the session's current state.
    #[error("key exchange not ready for this operation")]
    NotReady,

    /// The session is in the failed state and must be reset.
    #[error("key exchange failed; reset required")]
    Failed,

    /// Handshake frame was malformed.
    #[error("handshake frame rejected: {0}")]
    Frame(#[from] FrameError),
}

/// Errors in admission control.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionError {
    /// Requested per-command cap exceeds the protocol ceiling.
    #[error("per-command rate cap too high: {0} > 1000/s")]
    CapTooHigh(u16),
}

/// Why the pipeline rejected an inbound control frame.
///
/// Every rejection is recovered locally: the frame is dropped, the failsafe
/// records an unauthenticated packet, and processing continues.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Token bucket empty or command blocked.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Frame is encrypted but no session keys are installed.
    #[error("cipher not ready for encrypted frame")]
    CipherNotReady,

    /// HMAC tag did not match the decrypted payload.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Plaintext frame arrived while link policy mandates encryption.
    #[error("unencrypted frame rejected by policy")]
    EncryptionRequired,

    /// Frame failed structural validation.
    #[error("structural validation failed: {0}")]
    Structural(#[from] FrameError),

    /// Handshake frame failed key-exchange processing.
    #[error("handshake rejected: {0}")]
    Handshake(ExchangeError),
}

/// Top-level ROVELINK errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Frame codec error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Symmetric crypto error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Key-exchange error.
    #[error("key exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// Admission-control error.
    #[error("admission error: {0}")]
    Admission(#[from] AdmissionError),
}
