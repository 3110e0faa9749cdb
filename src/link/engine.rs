//! The inbound packet pipeline.
//!
//! [`CommandLink`] composes the codec, cipher, authenticator, key
//! exchange, rate limiter, and failsafe in a fixed order and exposes the
//! single accept/reject decision per received frame:
//!
//! 1. classify by length (unknown frames drop silently)
//! 2. admission: token bucket, keyed by the frame's mode byte
//! 3. decrypt the secured span, then authenticate the plaintext
//! 4. reject plaintext frames when link policy mandates encryption
//! 5. structural validation (version, checksum, vehicle tag)
//!
//! Every rejection after classification is reported to the failsafe as
//! "packet received, not authenticated": a malformed or forged frame
//! proves a transmitter exists but must not satisfy liveness. Handshake
//! frames bypass the pipeline and drive the key exchange instead.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::config::SecurityConfig;
use crate::core::constants::{
    CONTROL_SECURED_LEN, CONTROL_SECURED_OFFSET, TELEMETRY_SECURED_LEN, TELEMETRY_SECURED_OFFSET,
};
use crate::core::error::{CryptoError, ExchangeError, LinkError, RejectReason};
use crate::crypto::{
    ExchangeState, KeyExchange, PayloadAuthenticator, PayloadCipher, SessionKeys,
};
use crate::wire::{
    ControlFrame, ControlValues, FrameKind, FrameSecurity, HandshakeFrame, HandshakeKind,
    TelemetryFrame, classify,
};

use super::failsafe::{Failsafe, LivenessState};
use super::limiter::{Admission, RateLimiter};

/// Outcome of submitting one raw inbound buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Frame passed every gate; these controls were applied.
    Accepted(ControlValues),
    /// Handshake frame consumed; reply bytes to transmit, if any.
    HandshakeReply(Option<Vec<u8>>),
    /// Frame rejected for the given reason and dropped.
    Rejected(RejectReason),
    /// Unrecognized frame, dropped without touching the failsafe.
    Ignored,
}

/// Engine-level frame counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStats {
    /// Buffers handed to the pipeline.
    pub frames_submitted: u64,
    /// Control frames accepted and applied.
    pub frames_accepted: u64,
    /// Control or handshake frames rejected.
    pub frames_rejected: u64,
    /// Handshake frames consumed (accepted or not).
    pub handshake_frames: u64,
}

/// The live cipher/authenticator pair for one session.
///
/// Always replaced as a unit so a reader can never observe keys from two
/// different sessions.
struct SessionCrypto {
    cipher: PayloadCipher,
    auth: PayloadAuthenticator,
}

impl SessionCrypto {
    fn from_keys(keys: &SessionKeys) -> Self {
        Self {
            cipher: PayloadCipher::new(keys.cipher_key()),
            auth: PayloadAuthenticator::new(keys.auth_secret()),
        }
    }
}

/// The secure command link engine.
///
/// Owns every security component as an explicit instance; time enters
/// only through the `now` parameters, so the engine never reads a hidden
/// clock.
pub struct CommandLink {
    config: SecurityConfig,
    crypto: Option<SessionCrypto>,
    exchange: KeyExchange,
    limiter: RateLimiter,
    failsafe: Failsafe,
    last_controls: Option<ControlValues>,
    last_sequence: u32,
    stats: LinkStats,
}

impl CommandLink {
    /// Build the engine from provisioned configuration.
    ///
    /// A pre-shared secret, when present, installs session keys
    /// immediately, which also makes encryption mandatory.
    pub fn new(config: SecurityConfig, now: Instant) -> Self {
        let crypto = config
            .preshared_secret
            .map(|secret| {
                let keys =
                    SessionKeys::from_shared_secret(&crate::crypto::SharedSecret::from_bytes(secret));
                SessionCrypto::from_keys(&keys)
            });
        Self {
            limiter: RateLimiter::new(config.rate_limit_capacity, now),
            failsafe: Failsafe::new(now),
            crypto,
            exchange: KeyExchange::new(),
            config,
            last_controls: None,
            last_sequence: 0,
            stats: LinkStats::default(),
        }
    }

    /// Replace the session keys atomically.
    pub fn install_session_keys(&mut self, keys: &SessionKeys) {
        self.crypto = Some(SessionCrypto::from_keys(keys));
    }

    /// Apply an updated configuration.
    ///
    /// The rate limiter restarts with the new capacity; a pre-shared
    /// secret, when present, replaces the session keys as a whole.
    pub fn apply_security_config(&mut self, config: SecurityConfig, now: Instant) {
        if let Some(secret) = config.preshared_secret {
            let keys =
                SessionKeys::from_shared_secret(&crate::crypto::SharedSecret::from_bytes(secret));
            self.install_session_keys(&keys);
        }
        self.limiter = RateLimiter::new(config.rate_limit_capacity, now);
        self.config = config;
        info!("security configuration applied");
    }

    /// True once session keys are installed (pre-shared or negotiated).
    pub fn has_session(&self) -> bool {
        self.crypto.is_some()
    }

    /// Unencrypted frames are refused once policy or a live session
    /// demands protection.
    fn encryption_mandatory(&self) -> bool {
        self.config.require_encryption || self.crypto.is_some()
    }

    // =========================================================================
    // Inbound pipeline
    // =========================================================================

    /// Run one raw inbound buffer through the pipeline.
    pub fn submit_raw_frame(&mut self, bytes: &[u8], now: Instant) -> Verdict {
        self.stats.frames_submitted += 1;
        match classify(bytes.len()) {
            FrameKind::Control => self.process_control(bytes, now),
            FrameKind::Handshake => {
                self.stats.handshake_frames += 1;
                match self.supply_handshake_frame(bytes) {
                    Ok(reply) => Verdict::HandshakeReply(reply),
                    Err(err) => {
                        warn!(error = %err, "handshake frame rejected");
                        self.stats.frames_rejected += 1;
                        Verdict::Rejected(RejectReason::Handshake(err))
                    }
                }
            }
            // Inbound telemetry and unknown layouts are not ours to act on.
            FrameKind::Telemetry | FrameKind::Unknown => Verdict::Ignored,
        }
    }

    fn process_control(&mut self, bytes: &[u8], now: Instant) -> Verdict {
        let mut frame = match ControlFrame::decode(bytes) {
            Ok(frame) => frame,
            Err(err) => return self.reject(now, RejectReason::Structural(err)),
        };

        // Admission before any cryptographic work; the mode byte is the
        // command tag.
        match self.limiter.check_command(frame.mode, now) {
            Admission::Allowed => {}
            Admission::Exceeded | Admission::Blocked => {
                return self.reject(now, RejectReason::RateLimited);
            }
        }

        if let Some(security) = frame.security {
            let Some(crypto) = &self.crypto else {
                return self.reject(now, RejectReason::CipherNotReady);
            };
            let mut payload = frame.secured_payload();
            if crypto.cipher.decrypt(&mut payload, &security.nonce).is_err() {
                return self.reject(now, RejectReason::AuthenticationFailed);
            }
            if !crypto.auth.validate(&payload, &security.tag) {
                return self.reject(now, RejectReason::AuthenticationFailed);
            }
            frame.apply_secured_payload(&payload);
        } else if self.encryption_mandatory() {
            return self.reject(now, RejectReason::EncryptionRequired);
        }

        if let Err(err) = frame.validate(self.config.strict_vehicle_check) {
            return self.reject(now, RejectReason::Structural(err));
        }

        let controls = frame.controls();
        self.last_sequence = frame.sequence;
        self.last_controls = Some(controls);
        self.failsafe.record_packet(now, true);
        self.stats.frames_accepted += 1;
        debug!(sequence = frame.sequence, "control frame accepted");
        Verdict::Accepted(controls)
    }

    fn reject(&mut self, now: Instant, reason: RejectReason) -> Verdict {
        // A bad frame still proves a transmitter exists: recorded, but
        // never as authenticated.
        self.failsafe.record_packet(now, false);
        self.stats.frames_rejected += 1;
        debug!(reason = %reason, "control frame rejected");
        Verdict::Rejected(reason)
    }

    // =========================================================================
    // Key exchange
    // =========================================================================

    /// Start a handshake as initiator; returns the INIT frame to transmit.
    pub fn begin_handshake(&mut self) -> Result<Vec<u8>, ExchangeError> {
        self.exchange.reset();
        self.exchange.generate_key_pair()?;
        let frame = HandshakeFrame::new(HandshakeKind::Init, self.exchange.public_key()?);
        info!("handshake initiated");
        Ok(frame.encode())
    }

    /// Feed a received handshake frame to the key exchange.
    ///
    /// As responder (INIT received): reset, generate a fresh pair, derive
    /// the secret, install keys, and return the RESPONSE frame to send.
    /// As initiator (RESPONSE received): derive the same secret and
    /// install keys; no reply.
    pub fn supply_handshake_frame(
        &mut self,
        bytes: &[u8],
    ) -> Result<Option<Vec<u8>>, ExchangeError> {
        let frame = HandshakeFrame::decode(bytes)?;
        frame.validate()?;

        match frame.kind {
            HandshakeKind::Init => {
                self.exchange.reset();
                self.exchange.generate_key_pair()?;
                self.exchange.compute_shared_secret(&frame.public_key)?;
                self.adopt_exchange_secret()?;
                let reply =
                    HandshakeFrame::new(HandshakeKind::Response, self.exchange.public_key()?);
                info!("handshake answered; secure session established");
                Ok(Some(reply.encode()))
            }
            HandshakeKind::Response => {
                self.exchange.compute_shared_secret(&frame.public_key)?;
                self.adopt_exchange_secret()?;
                info!("handshake complete; secure session established");
                Ok(None)
            }
        }
    }

    fn adopt_exchange_secret(&mut self) -> Result<(), ExchangeError> {
        let secret = self.exchange.shared_secret().ok_or(ExchangeError::NotReady)?;
        let keys = SessionKeys::from_shared_secret(secret);
        self.install_session_keys(&keys);
        Ok(())
    }

    /// Current key-exchange state.
    pub fn exchange_state(&self) -> ExchangeState {
        self.exchange.state()
    }

    // =========================================================================
    // Control loop
    // =========================================================================

    /// Drive time-based logic; call at the control-loop cadence.
    pub fn tick(&mut self, now: Instant) {
        self.failsafe.update(now);
    }

    /// True while the operator link is trustworthy (not in emergency).
    pub fn is_link_live(&self) -> bool {
        !self.failsafe.is_failsafe_active()
    }

    /// Current liveness state.
    pub fn liveness(&self) -> LivenessState {
        self.failsafe.state()
    }

    /// Read access to the failsafe (indicator, counters).
    pub fn failsafe(&self) -> &Failsafe {
        &self.failsafe
    }

    /// Admission counters.
    pub fn limiter_stats(&self) -> super::limiter::RateLimiterStats {
        self.limiter.stats()
    }

    /// Record a per-command-type cap (bookkeeping; at most 1000/s).
    pub fn set_command_cap(
        &mut self,
        command: u8,
        max_per_second: u16,
    ) -> Result<(), crate::core::error::AdmissionError> {
        self.limiter.set_command_cap(command, max_per_second)
    }

    /// The last validated control values, if any frame was ever accepted.
    pub fn last_validated_controls(&self) -> Option<ControlValues> {
        self.last_controls
    }

    /// Sequence number of the last accepted frame.
    pub fn last_sequence(&self) -> u32 {
        self.last_sequence
    }

    /// Control values the vehicle may act on right now.
    ///
    /// Neutral while the failsafe is active or before any accepted frame.
    pub fn control_output(&self) -> ControlValues {
        if self.failsafe.is_failsafe_active() {
            return ControlValues::NEUTRAL;
        }
        self.last_controls.unwrap_or(ControlValues::NEUTRAL)
    }

    /// Engine-level frame counters.
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    // =========================================================================
    // Outbound
    // =========================================================================

    /// Seal an outbound telemetry frame into wire bytes.
    ///
    /// Under a mandatory-encryption link the secured span is tagged over
    /// plaintext, the checksum stamped, and the span encrypted last.
    pub fn encrypt_outbound_telemetry(
        &self,
        telemetry: &mut TelemetryFrame,
    ) -> Result<Vec<u8>, LinkError> {
        if !self.encryption_mandatory() {
            telemetry.security = None;
            telemetry.update_checksum();
            return Ok(telemetry.encode());
        }

        let crypto = self.crypto.as_ref().ok_or(CryptoError::NotInitialized)?;
        let nonce = crypto.cipher.generate_nonce()?;
        let tag = crypto.auth.generate(&telemetry.secured_payload())?;
        telemetry.security = Some(FrameSecurity { nonce, tag });
        telemetry.update_checksum();

        let mut bytes = telemetry.encode();
        let span = TELEMETRY_SECURED_OFFSET..TELEMETRY_SECURED_OFFSET + TELEMETRY_SECURED_LEN;
        crypto.cipher.encrypt(&mut bytes[span], &nonce)?;
        Ok(bytes)
    }

    /// Seal an outbound control frame into wire bytes.
    ///
    /// The transmit-side mirror of the inbound pipeline, used by the
    /// operator station running this same engine.
    pub fn seal_control_frame(&self, frame: &mut ControlFrame) -> Result<Vec<u8>, LinkError> {
        let crypto = self.crypto.as_ref().ok_or(CryptoError::NotInitialized)?;
        let nonce = crypto.cipher.generate_nonce()?;
        let tag = crypto.auth.generate(&frame.secured_payload())?;
        frame.security = Some(FrameSecurity { nonce, tag });
        frame.update_checksum();

        let mut bytes = frame.encode();
        let span = CONTROL_SECURED_OFFSET..CONTROL_SECURED_OFFSET + CONTROL_SECURED_LEN;
        crypto.cipher.encrypt(&mut bytes[span], &nonce)?;
        Ok(bytes)
    }
}
