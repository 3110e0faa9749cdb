//! Frame encoding, decoding, and structural validation.
//!
//! Three fixed-size little-endian layouts share the transport:
//!
//! ```text
//! Control   = version | vehicle | throttle | roll | pitch | yaw | mode
//!           | buttons | sequence | flags | [nonce | tag] | crc16
//! Telemetry = version | flags | battery | rssi | uptime | lat | lon
//!           | status | [nonce | tag] | crc16
//! Handshake = version | kind | public_key(64) | crc16
//! ```
//!
//! The nonce and tag are present exactly when the flags byte has the
//! encrypted bit set, so every frame kind has two possible lengths and
//! inbound buffers classify by length alone. The checksum covers every
//! byte of the frame except itself and is always computed over the
//! plaintext rendering; the secured span is encrypted last on send and
//! decrypted first on receive.

use crate::core::constants::{
    CONTROL_FRAME_PLAIN_LEN, CONTROL_FRAME_SECURED_LEN, CONTROL_SECURED_LEN, HANDSHAKE_FRAME_LEN,
    NONCE_SIZE, PROTOCOL_VERSION, PUBLIC_KEY_SIZE, TAG_SIZE, TELEMETRY_FRAME_PLAIN_LEN,
    TELEMETRY_FRAME_SECURED_LEN, TELEMETRY_SECURED_LEN,
};
use crate::core::error::FrameError;

use super::crc::crc16;

/// Flags bit: payload is encrypted and authenticated.
const FLAG_ENCRYPTED: u8 = 0x01;

/// The four vehicle types a control frame may address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VehicleKind {
    /// Multirotor.
    Copter = 1,
    /// Fixed-wing plane.
    Plane = 2,
    /// Ground rover.
    Rover = 3,
    /// Submersible.
    Sub = 4,
}

impl VehicleKind {
    /// Parse a vehicle-type tag from a byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Copter),
            2 => Some(Self::Plane),
            3 => Some(Self::Rover),
            4 => Some(Self::Sub),
            _ => None,
        }
    }

    /// Convert the tag to its byte representation.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Inbound frame kind, decided by buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Key-exchange handshake frame.
    Handshake,
    /// Operator control frame.
    Control,
    /// Telemetry frame (outbound; ignored when received).
    Telemetry,
    /// No known layout; dropped silently.
    Unknown,
}

/// Classify a raw buffer by its exact length.
pub fn classify(len: usize) -> FrameKind {
    match len {
        HANDSHAKE_FRAME_LEN => FrameKind::Handshake,
        CONTROL_FRAME_PLAIN_LEN | CONTROL_FRAME_SECURED_LEN => FrameKind::Control,
        TELEMETRY_FRAME_PLAIN_LEN | TELEMETRY_FRAME_SECURED_LEN => FrameKind::Telemetry,
        _ => FrameKind::Unknown,
    }
}

/// Per-frame nonce and authentication tag, carried only by encrypted frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSecurity {
    /// AES-CTR initial counter block, fresh per frame.
    pub nonce: [u8; NONCE_SIZE],
    /// HMAC-SHA256 tag over the plaintext secured span.
    pub tag: [u8; TAG_SIZE],
}

/// Validated control values handed to the vehicle collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlValues {
    /// Throttle axis.
    pub throttle: i16,
    /// Roll axis (steering on rovers).
    pub roll: i16,
    /// Pitch axis.
    pub pitch: i16,
    /// Yaw axis.
    pub yaw: i16,
    /// Mode bitfield.
    pub mode: u8,
    /// Buttons bitfield.
    pub buttons: u8,
}

impl ControlValues {
    /// All axes centered, everything disarmed. The failsafe output.
    pub const NEUTRAL: Self = Self {
        throttle: 0,
        roll: 0,
        pitch: 0,
        yaw: 0,
        mode: 0,
        buttons: 0,
    };
}

/// Operator control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    /// Protocol version.
    pub version: u8,
    /// Vehicle-type tag (raw; strict validation checks it).
    pub vehicle: u8,
    /// Throttle axis.
    pub throttle: i16,
    /// Roll axis.
    pub roll: i16,
    /// Pitch axis.
    pub pitch: i16,
    /// Yaw axis.
    pub yaw: i16,
    /// Mode bitfield.
    pub mode: u8,
    /// Buttons bitfield.
    pub buttons: u8,
    /// Monotonically increasing sequence number.
    pub sequence: u32,
    /// Nonce and tag when the payload is encrypted.
    pub security: Option<FrameSecurity>,
    /// CRC-16 over every other byte of the frame.
    pub checksum: u16,
}

impl ControlFrame {
    /// Create a neutral plaintext frame for the given vehicle.
    pub fn new(vehicle: VehicleKind, sequence: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            vehicle: vehicle.as_byte(),
            throttle: 0,
            roll: 0,
            pitch: 0,
            yaw: 0,
            mode: 0,
            buttons: 0,
            sequence,
            security: None,
            checksum: 0,
        }
    }

    /// Encoded length for the frame's current security setting.
    pub fn encoded_len(&self) -> usize {
        if self.security.is_some() {
            CONTROL_FRAME_SECURED_LEN
        } else {
            CONTROL_FRAME_PLAIN_LEN
        }
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.version);
        out.push(self.vehicle);
        out.extend_from_slice(&self.throttle.to_le_bytes());
        out.extend_from_slice(&self.roll.to_le_bytes());
        out.extend_from_slice(&self.pitch.to_le_bytes());
        out.extend_from_slice(&self.yaw.to_le_bytes());
        out.push(self.mode);
        out.push(self.buttons);
        out.extend_from_slice(&self.sequence.to_le_bytes());
        match &self.security {
            Some(sec) => {
                out.push(FLAG_ENCRYPTED);
                out.extend_from_slice(&sec.nonce);
                out.extend_from_slice(&sec.tag);
            }
            None => out.push(0),
        }
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// Parse from wire bytes. Never panics; never mutates on failure.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let secured = match bytes.len() {
            CONTROL_FRAME_PLAIN_LEN => false,
            CONTROL_FRAME_SECURED_LEN => true,
            other => return Err(FrameError::UnknownLength(other)),
        };

        let flags = bytes[16];
        if (flags & FLAG_ENCRYPTED != 0) != secured {
            return Err(FrameError::SecurityMismatch);
        }

        let security = if secured {
            let mut nonce = [0u8; NONCE_SIZE];
            let mut tag = [0u8; TAG_SIZE];
            nonce.copy_from_slice(&bytes[17..17 + NONCE_SIZE]);
            tag.copy_from_slice(&bytes[33..33 + TAG_SIZE]);
            Some(FrameSecurity { nonce, tag })
        } else {
            None
        };

        let len = bytes.len();
        Ok(Self {
            version: bytes[0],
            vehicle: bytes[1],
            throttle: i16::from_le_bytes([bytes[2], bytes[3]]),
            roll: i16::from_le_bytes([bytes[4], bytes[5]]),
            pitch: i16::from_le_bytes([bytes[6], bytes[7]]),
            yaw: i16::from_le_bytes([bytes[8], bytes[9]]),
            mode: bytes[10],
            buttons: bytes[11],
            sequence: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            security,
            checksum: u16::from_le_bytes([bytes[len - 2], bytes[len - 1]]),
        })
    }

    /// Recompute and store the checksum over all frame bytes except itself.
    pub fn update_checksum(&mut self) {
        let encoded = self.encode();
        self.checksum = crc16(&encoded[..encoded.len() - 2]);
    }

    /// Check the stored checksum against the recomputed one.
    pub fn verify_checksum(&self) -> bool {
        let encoded = self.encode();
        self.checksum == crc16(&encoded[..encoded.len() - 2])
    }

    /// Structural validation: version, checksum, and (strict) vehicle tag.
    pub fn validate(&self, strict: bool) -> Result<(), FrameError> {
        if self.version != PROTOCOL_VERSION {
            return Err(FrameError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: self.version,
            });
        }
        let encoded = self.encode();
        let computed = crc16(&encoded[..encoded.len() - 2]);
        if self.checksum != computed {
            return Err(FrameError::ChecksumMismatch {
                stored: self.checksum,
                computed,
            });
        }
        if strict && VehicleKind::from_byte(self.vehicle).is_none() {
            return Err(FrameError::UnknownVehicle(self.vehicle));
        }
        Ok(())
    }

    /// Boolean form of [`validate`](Self::validate).
    pub fn is_structurally_valid(&self, strict: bool) -> bool {
        self.validate(strict).is_ok()
    }

    /// The mutable axis/mode/button fields as the secured span.
    pub fn secured_payload(&self) -> [u8; CONTROL_SECURED_LEN] {
        let mut span = [0u8; CONTROL_SECURED_LEN];
        span[0..2].copy_from_slice(&self.throttle.to_le_bytes());
        span[2..4].copy_from_slice(&self.roll.to_le_bytes());
        span[4..6].copy_from_slice(&self.pitch.to_le_bytes());
        span[6..8].copy_from_slice(&self.yaw.to_le_bytes());
        span[8] = self.mode;
        span[9] = self.buttons;
        span
    }

    /// Write a (decrypted) secured span back into the frame fields.
    pub fn apply_secured_payload(&mut self, span: &[u8; CONTROL_SECURED_LEN]) {
        self.throttle = i16::from_le_bytes([span[0], span[1]]);
        self.roll = i16::from_le_bytes([span[2], span[3]]);
        self.pitch = i16::from_le_bytes([span[4], span[5]]);
        self.yaw = i16::from_le_bytes([span[6], span[7]]);
        self.mode = span[8];
        self.buttons = span[9];
    }

    /// Extract the validated control values.
    pub fn controls(&self) -> ControlValues {
        ControlValues {
            throttle: self.throttle,
            roll: self.roll,
            pitch: self.pitch,
            yaw: self.yaw,
            mode: self.mode,
            buttons: self.buttons,
        }
    }
}

/// Outbound status frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFrame {
    /// Protocol version.
    pub version: u8,
    /// Battery voltage in volts.
    pub battery_volts: f32,
    /// Received signal strength, dBm.
    pub rssi: i16,
    /// Uptime in milliseconds.
    pub uptime_ms: u32,
    /// Latitude in degrees; 0.0 without a fix.
    pub latitude: f32,
    /// Longitude in degrees; 0.0 without a fix.
    pub longitude: f32,
    /// Status bitfield (`STATUS_*` constants).
    pub status: u8,
    /// Nonce and tag when the payload is encrypted.
    pub security: Option<FrameSecurity>,
    /// CRC-16 over every other byte of the frame.
    pub checksum: u16,
}

impl TelemetryFrame {
    /// Create an empty plaintext telemetry frame.
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            battery_volts: 0.0,
            rssi: 0,
            uptime_ms: 0,
            latitude: 0.0,
            longitude: 0.0,
            status: 0,
            security: None,
            checksum: 0,
        }
    }

    /// Encoded length for the frame's current security setting.
    pub fn encoded_len(&self) -> usize {
        if self.security.is_some() {
            TELEMETRY_FRAME_SECURED_LEN
        } else {
            TELEMETRY_FRAME_PLAIN_LEN
        }
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.version);
        out.push(if self.security.is_some() { FLAG_ENCRYPTED } else { 0 });
        out.extend_from_slice(&self.battery_volts.to_le_bytes());
        out.extend_from_slice(&self.rssi.to_le_bytes());
        out.extend_from_slice(&self.uptime_ms.to_le_bytes());
        out.extend_from_slice(&self.latitude.to_le_bytes());
        out.extend_from_slice(&self.longitude.to_le_bytes());
        out.push(self.status);
        if let Some(sec) = &self.security {
            out.extend_from_slice(&sec.nonce);
            out.extend_from_slice(&sec.tag);
        }
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// Parse from wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let secured = match bytes.len() {
            TELEMETRY_FRAME_PLAIN_LEN => false,
            TELEMETRY_FRAME_SECURED_LEN => true,
            other => return Err(FrameError::UnknownLength(other)),
        };

        if (bytes[1] & FLAG_ENCRYPTED != 0) != secured {
            return Err(FrameError::SecurityMismatch);
        }

        let security = if secured {
            let mut nonce = [0u8; NONCE_SIZE];
            let mut tag = [0u8; TAG_SIZE];
            nonce.copy_from_slice(&bytes[21..21 + NONCE_SIZE]);
            tag.copy_from_slice(&bytes[37..37 + TAG_SIZE]);
            Some(FrameSecurity { nonce, tag })
        } else {
            None
        };

        let len = bytes.len();
        Ok(Self {
            version: bytes[0],
            battery_volts: f32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            rssi: i16::from_le_bytes([bytes[6], bytes[7]]),
            uptime_ms: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            latitude: f32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            longitude: f32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            status: bytes[20],
            security,
            checksum: u16::from_le_bytes([bytes[len - 2], bytes[len - 1]]),
        })
    }

    /// Recompute and store the checksum over all frame bytes except itself.
    pub fn update_checksum(&mut self) {
        let encoded = self.encode();
        self.checksum = crc16(&encoded[..encoded.len() - 2]);
    }

    /// Check the stored checksum against the recomputed one.
    pub fn verify_checksum(&self) -> bool {
        let encoded = self.encode();
        self.checksum == crc16(&encoded[..encoded.len() - 2])
    }

    /// Structural validation: version and checksum.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.version != PROTOCOL_VERSION {
            return Err(FrameError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: self.version,
            });
        }
        let encoded = self.encode();
        let computed = crc16(&encoded[..encoded.len() - 2]);
        if self.checksum != computed {
            return Err(FrameError::ChecksumMismatch {
                stored: self.checksum,
                computed,
            });
        }
        Ok(())
    }

    /// The battery-through-status fields as the secured span.
    pub fn secured_payload(&self) -> [u8; TELEMETRY_SECURED_LEN] {
        let mut span = [0u8; TELEMETRY_SECURED_LEN];
        span[0..4].copy_from_slice(&self.battery_volts.to_le_bytes());
        span[4..6].copy_from_slice(&self.rssi.to_le_bytes());
        span[6..10].copy_from_slice(&self.uptime_ms.to_le_bytes());
        span[10..14].copy_from_slice(&self.latitude.to_le_bytes());
        span[14..18].copy_from_slice(&self.longitude.to_le_bytes());
        span[18] = self.status;
        span
    }

    /// Write a (decrypted) secured span back into the frame fields.
    pub fn apply_secured_payload(&mut self, span: &[u8; TELEMETRY_SECURED_LEN]) {
        self.battery_volts = f32::from_le_bytes([span[0], span[1], span[2], span[3]]);
        self.rssi = i16::from_le_bytes([span[4], span[5]]);
        self.uptime_ms = u32::from_le_bytes([span[6], span[7], span[8], span[9]]);
        self.latitude = f32::from_le_bytes([span[10], span[11], span[12], span[13]]);
        self.longitude = f32::from_le_bytes([span[14], span[15], span[16], span[17]]);
        self.status = span[18];
    }
}

impl Default for TelemetryFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Handshake message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HandshakeKind {
    /// Initiator's public key, opens the exchange.
    Init = 0x01,
    /// Responder's public key, completes it.
    Response = 0x02,
}

impl HandshakeKind {
    /// Parse a handshake kind from a byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Init),
            0x02 => Some(Self::Response),
            _ => None,
        }
    }

    /// Convert the kind to its byte representation.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Key-exchange handshake frame, created transiently per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeFrame {
    /// Protocol version.
    pub version: u8,
    /// Message type.
    pub kind: HandshakeKind,
    /// Raw P-256 public point, X || Y without the SEC1 marker byte.
    pub public_key: [u8; PUBLIC_KEY_SIZE],
    /// CRC-16 over every other byte of the frame.
    pub checksum: u16,
}

impl HandshakeFrame {
    /// Create a handshake frame carrying the given public key.
    pub fn new(kind: HandshakeKind, public_key: [u8; PUBLIC_KEY_SIZE]) -> Self {
        let mut frame = Self {
            version: PROTOCOL_VERSION,
            kind,
            public_key,
            checksum: 0,
        };
        frame.update_checksum();
        frame
    }

    /// Serialize to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HANDSHAKE_FRAME_LEN);
        out.push(self.version);
        out.push(self.kind.as_byte());
        out.extend_from_slice(&self.public_key);
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out
    }

    /// Parse from wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() != HANDSHAKE_FRAME_LEN {
            return Err(FrameError::UnknownLength(bytes.len()));
        }
        let kind =
            HandshakeKind::from_byte(bytes[1]).ok_or(FrameError::UnknownHandshakeKind(bytes[1]))?;
        let mut public_key = [0u8; PUBLIC_KEY_SIZE];
        public_key.copy_from_slice(&bytes[2..2 + PUBLIC_KEY_SIZE]);
        Ok(Self {
            version: bytes[0],
            kind,
            public_key,
            checksum: u16::from_le_bytes([bytes[66], bytes[67]]),
        })
    }

    /// Recompute and store the checksum over all frame bytes except itself.
    pub fn update_checksum(&mut self) {
        let encoded = self.encode();
        self.checksum = crc16(&encoded[..encoded.len() - 2]);
    }

    /// Structural validation: version and checksum.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.version != PROTOCOL_VERSION {
            return Err(FrameError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: self.version,
            });
        }
        let encoded = self.encode();
        let computed = crc16(&encoded[..encoded.len() - 2]);
        if self.checksum != computed {
            return Err(FrameError::ChecksumMismatch {
                stored: self.checksum,
                computed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{
        CONTROL_SECURED_OFFSET as CTRL_OFF, TELEMETRY_SECURED_OFFSET as TEL_OFF,
    };

    fn sample_frame() -> ControlFrame {
        let mut frame = ControlFrame::new(VehicleKind::Rover, 1);
        frame.throttle = 500;
        frame.roll = -200;
        frame.mode = crate::core::constants::MODE_ARMED;
        frame
    }

    #[test]
    fn test_control_frame_lengths() {
        let mut frame = sample_frame();
        assert_eq!(frame.encode().len(), CONTROL_FRAME_PLAIN_LEN);

        frame.security = Some(FrameSecurity {
            nonce: [0; NONCE_SIZE],
            tag: [0; TAG_SIZE],
        });
        assert_eq!(frame.encode().len(), CONTROL_FRAME_SECURED_LEN);
    }

    #[test]
    fn test_control_frame_roundtrip() {
        let mut frame = sample_frame();
        frame.update_checksum();
        let decoded = ControlFrame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_control_frame_secured_roundtrip() {
        let mut frame = sample_frame();
        frame.security = Some(FrameSecurity {
            nonce: [0xA5; NONCE_SIZE],
            tag: [0x5A; TAG_SIZE],
        });
        frame.update_checksum();
        let decoded = ControlFrame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_checksum_update_then_validate() {
        let mut frame = sample_frame();
        frame.update_checksum();
        assert_ne!(frame.checksum, 0);
        assert!(frame.verify_checksum());
        assert!(frame.is_structurally_valid(true));
    }

    #[test]
    fn test_corrupted_checksum_fails() {
        let mut frame = sample_frame();
        frame.update_checksum();
        frame.checksum ^= 0xFFFF;
        assert!(!frame.verify_checksum());
        assert!(!frame.is_structurally_valid(false));
    }

    #[test]
    fn test_single_checksum_bit_flip_fails() {
        let mut frame = sample_frame();
        frame.update_checksum();
        for bit in 0..16 {
            let mut tampered = frame.clone();
            tampered.checksum ^= 1 << bit;
            assert!(!tampered.verify_checksum(), "flip of checksum bit {bit} passed");
        }
    }

    #[test]
    fn test_wrong_version_fails_validation() {
        let mut frame = sample_frame();
        frame.version = 0x99;
        frame.update_checksum();
        assert_eq!(
            frame.validate(true),
            Err(FrameError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: 0x99
            })
        );
    }

    #[test]
    fn test_strict_validation_all_vehicles() {
        for tag in 1..=4u8 {
            let mut frame = sample_frame();
            frame.vehicle = tag;
            frame.update_checksum();
            assert!(frame.is_structurally_valid(true), "vehicle tag {tag} rejected");
        }
    }

    #[test]
    fn test_strict_validation_invalid_vehicle() {
        for tag in [0u8, 5] {
            let mut frame = sample_frame();
            frame.vehicle = tag;
            frame.update_checksum();
            assert_eq!(frame.validate(true), Err(FrameError::UnknownVehicle(tag)));
            // Non-strict mode ignores the tag.
            assert!(frame.is_structurally_valid(false));
        }
    }

    #[test]
    fn test_security_flag_length_mismatch() {
        let mut frame = sample_frame();
        frame.update_checksum();
        let mut bytes = frame.encode();
        bytes[16] |= FLAG_ENCRYPTED; // claim encryption in a 19-byte frame
        assert_eq!(ControlFrame::decode(&bytes), Err(FrameError::SecurityMismatch));
    }

    #[test]
    fn test_secured_payload_matches_encoding() {
        let frame = sample_frame();
        let bytes = frame.encode();
        assert_eq!(
            frame.secured_payload(),
            bytes[CTRL_OFF..CTRL_OFF + CONTROL_SECURED_LEN]
        );
    }

    #[test]
    fn test_secured_payload_roundtrip() {
        let frame = sample_frame();
        let span = frame.secured_payload();
        let mut restored = ControlFrame::new(VehicleKind::Rover, 1);
        restored.apply_secured_payload(&span);
        assert_eq!(restored.controls(), frame.controls());
    }

    #[test]
    fn test_telemetry_roundtrip() {
        let mut frame = TelemetryFrame::new();
        frame.battery_volts = 12.5;
        frame.rssi = -65;
        frame.uptime_ms = 5000;
        frame.update_checksum();
        assert_eq!(frame.encode().len(), TELEMETRY_FRAME_PLAIN_LEN);

        let decoded = TelemetryFrame::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn test_telemetry_secured_payload_matches_encoding() {
        let mut frame = TelemetryFrame::new();
        frame.battery_volts = 11.1;
        frame.uptime_ms = 42;
        frame.status = crate::core::constants::STATUS_GPS_LOCK;
        let bytes = frame.encode();
        assert_eq!(
            frame.secured_payload(),
            bytes[TEL_OFF..TEL_OFF + TELEMETRY_SECURED_LEN]
        );
    }

    #[test]
    fn test_telemetry_wrong_version() {
        let mut frame = TelemetryFrame::new();
        frame.version = 0x99;
        frame.update_checksum();
        assert!(frame.validate().is_err());
    }

    #[test]
    fn test_handshake_roundtrip() {
        let frame = HandshakeFrame::new(HandshakeKind::Init, [0x42; PUBLIC_KEY_SIZE]);
        let bytes = frame.encode();
        assert_eq!(bytes.len(), HANDSHAKE_FRAME_LEN);

        let decoded = HandshakeFrame::decode(&bytes).unwrap();
        assert_eq!(decoded, frame);
        assert!(decoded.validate().is_ok());
    }

    #[test]
    fn test_handshake_unknown_kind() {
        let frame = HandshakeFrame::new(HandshakeKind::Response, [0x42; PUBLIC_KEY_SIZE]);
        let mut bytes = frame.encode();
        bytes[1] = 0x07;
        assert_eq!(
            HandshakeFrame::decode(&bytes),
            Err(FrameError::UnknownHandshakeKind(0x07))
        );
    }

    #[test]
    fn test_classify_by_length() {
        assert_eq!(classify(HANDSHAKE_FRAME_LEN), FrameKind::Handshake);
        assert_eq!(classify(CONTROL_FRAME_PLAIN_LEN), FrameKind::Control);
        assert_eq!(classify(CONTROL_FRAME_SECURED_LEN), FrameKind::Control);
        assert_eq!(classify(TELEMETRY_FRAME_PLAIN_LEN), FrameKind::Telemetry);
        assert_eq!(classify(TELEMETRY_FRAME_SECURED_LEN), FrameKind::Telemetry);
        assert_eq!(classify(0), FrameKind::Unknown);
        assert_eq!(classify(64), FrameKind::Unknown);
    }

    #[test]
    fn test_vehicle_kind_tags() {
        assert_eq!(VehicleKind::from_byte(1), Some(VehicleKind::Copter));
        assert_eq!(VehicleKind::from_byte(4), Some(VehicleKind::Sub));
        assert_eq!(VehicleKind::from_byte(0), None);
        assert_eq!(VehicleKind::from_byte(5), None);
        assert_eq!(VehicleKind::Plane.as_byte(), 2);
    }
}
