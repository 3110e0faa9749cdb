//! # ROVELINK
//!
//! **R**emote-**O**perated **VE**hicle **LINK**
//!
//! ROVELINK is the secure command-and-control link engine for
//! remote-operated vehicles (multirotors, planes, rovers, submersibles).
//! It accepts short binary control packets from an unreliable wireless or
//! serial transport and decides, frame by frame, whether the vehicle may
//! act on them. It provides:
//!
//! - **Integrity**: CRC-16 framing with strict structural validation
//! - **Confidentiality**: AES-256-CTR payload encryption with per-frame nonces
//! - **Authenticity**: HMAC-SHA256 tags, compared in constant time
//! - **Key agreement**: two-message ECDH handshake on NIST P-256
//! - **Admission control**: token-bucket rate limiting ahead of all crypto
//! - **Liveness**: a failsafe state machine driven only by authenticated traffic
//!
//! ## Feature Flags
//!
//! - `transport` (default): bounded frame intake channel between the
//!   transport receive callback and the control loop
//!
//! ## Modules
//!
//! - [`core`]: constants, configuration, and error types
//! - [`wire`]: frame layouts, CRC-16, and structural validation
//! - [`crypto`]: cipher, authenticator, key derivation, and key exchange
//! - [`link`]: rate limiter, failsafe, and the inbound packet pipeline
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Instant;
//! use rovelink::prelude::*;
//!
//! let now = Instant::now();
//! let mut link = CommandLink::new(SecurityConfig::default(), now);
//!
//! // Control loop, 50 Hz
//! link.tick(now);
//! assert_eq!(link.liveness(), LivenessState::Armed);
//!
//! // Frames from the radio go through the pipeline
//! let mut frame = ControlFrame::new(VehicleKind::Rover, 1);
//! frame.throttle = 500;
//! frame.update_checksum();
//! match link.submit_raw_frame(&frame.encode(), now) {
//!     Verdict::Accepted(controls) => assert_eq!(controls.throttle, 500),
//!     other => panic!("rejected: {other:?}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Core module (always included)
pub mod core;

// Wire formats
pub mod wire;

// Crypto suite
pub mod crypto;

// Link engine (pipeline, rate limiter, failsafe)
pub mod link;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::wire::{
        ControlFrame, ControlValues, FrameKind, FrameSecurity, HandshakeFrame, HandshakeKind,
        TelemetryFrame, VehicleKind, classify, crc16,
    };

    pub use crate::crypto::{
        ExchangeState, KeyExchange, PayloadAuthenticator, PayloadCipher, SessionKeys,
        SharedSecret, derive_key,
    };

    pub use crate::link::{
        Admission, CommandLink, Failsafe, IndicatorPattern, LinkStats, LivenessState, RateLimiter,
        RateLimiterStats, Verdict,
    };

    #[cfg(feature = "transport")]
    pub use crate::link::intake::{FrameReceiver, FrameSender, intake_channel};
}

// Re-export commonly used items at crate root
pub use crate::core::{LinkError, RejectReason, SecurityConfig};
pub use crate::crypto::{KeyExchange, SessionKeys};
pub use crate::link::{CommandLink, LivenessState, Verdict};
pub use crate::wire::{ControlFrame, ControlValues, TelemetryFrame};
