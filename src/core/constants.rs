//! Protocol constants for the ROVELINK command link.
//!
//! These values are fixed by the wire protocol and the safety model.
//! Changing any of them breaks interoperability with a paired device.

use std::time::Duration;

// =============================================================================
// CRYPTOGRAPHIC CONSTANTS
// =============================================================================

/// AES-256 key size.
pub const CIPHER_KEY_SIZE: usize = 32;

/// AES-CTR nonce (initial counter block) size.
pub const NONCE_SIZE: usize = 16;

/// HMAC-SHA256 tag size.
pub const TAG_SIZE: usize = 32;

/// HMAC secret size.
pub const AUTH_SECRET_SIZE: usize = 32;

/// Upper bound on any encrypted or authenticated payload.
///
/// Control and telemetry payloads are far smaller; the bound exists so a
/// corrupted length can never drive the crypto layer into large buffers.
pub const MAX_SECURED_PAYLOAD: usize = 64;

/// P-256 public key as a raw point (X || Y, no SEC1 marker byte).
pub const PUBLIC_KEY_SIZE: usize = 64;

/// ECDH shared secret size (raw x-coordinate).
pub const SHARED_SECRET_SIZE: usize = 32;

/// Minimum PBKDF2 iteration count accepted by key derivation.
pub const MIN_KDF_ITERATIONS: u32 = 10_000;

/// PBKDF2 salt size.
pub const KDF_SALT_SIZE: usize = 16;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Protocol version carried in every frame.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Control frame without nonce/tag (encryption flag clear).
pub const CONTROL_FRAME_PLAIN_LEN: usize = 19;

/// Control frame with nonce and tag (encryption flag set).
pub const CONTROL_FRAME_SECURED_LEN: usize =
    CONTROL_FRAME_PLAIN_LEN + NONCE_SIZE + TAG_SIZE;

/// Telemetry frame without nonce/tag.
pub const TELEMETRY_FRAME_PLAIN_LEN: usize = 23;

/// Telemetry frame with nonce and tag.
pub const TELEMETRY_FRAME_SECURED_LEN: usize =
    TELEMETRY_FRAME_PLAIN_LEN + NONCE_SIZE + TAG_SIZE;

/// Handshake frame (version + kind + raw public key + checksum).
pub const HANDSHAKE_FRAME_LEN: usize = 2 + PUBLIC_KEY_SIZE + 2;

/// Bytes of a control frame covered by encryption and authentication:
/// exactly the mutable axis/mode/button fields (throttle through buttons).
pub const CONTROL_SECURED_LEN: usize = 10;

/// First byte of the control frame's secured span.
pub const CONTROL_SECURED_OFFSET: usize = 2;

/// Bytes of a telemetry frame covered by encryption and authentication:
/// battery voltage through the status bitfield.
pub const TELEMETRY_SECURED_LEN: usize = 19;

/// First byte of the telemetry frame's secured span.
pub const TELEMETRY_SECURED_OFFSET: usize = 2;

/// CRC-16 value of an empty buffer (the initial register value).
pub const CRC16_INIT: u16 = 0xFFFF;

// =============================================================================
// MODE AND STATUS BITS
// =============================================================================

/// Mode bit: vehicle armed.
pub const MODE_ARMED: u8 = 0x01;

/// Mode bit: autonomous navigation active.
pub const MODE_AUTO: u8 = 0x02;

/// Telemetry status bit: failsafe currently active.
pub const STATUS_FAILSAFE: u8 = 0x01;

/// Telemetry status bit: GPS lock acquired.
pub const STATUS_GPS_LOCK: u8 = 0x02;

// =============================================================================
// ADMISSION CONTROL
// =============================================================================

/// Default token bucket capacity (commands per second at the default rate).
pub const RATE_LIMIT_CAPACITY: u16 = 100;

/// One token is refilled per interval.
pub const RATE_LIMIT_REFILL_INTERVAL: Duration = Duration::from_millis(10);

/// Ceiling for any per-command-type cap.
pub const MAX_COMMAND_RATE: u16 = 1000;

// =============================================================================
// LINK LIVENESS
// =============================================================================

/// Below this gap since the last authenticated packet the link is armed.
pub const SIGNAL_LOSS_THRESHOLD: Duration = Duration::from_millis(500);

/// Above this gap the link enters emergency failsafe.
pub const FAILSAFE_THRESHOLD: Duration = Duration::from_millis(2000);

/// Indicator blink half-period while armed.
pub const INDICATOR_ARMED_PERIOD: Duration = Duration::from_millis(1000);

/// Indicator blink half-period during signal loss.
pub const INDICATOR_SIGNAL_LOSS_PERIOD: Duration = Duration::from_millis(200);

/// Indicator blink half-period during emergency failsafe.
pub const INDICATOR_EMERGENCY_PERIOD: Duration = Duration::from_millis(100);

// =============================================================================
// CADENCE
// =============================================================================

/// Target control-loop period (50 Hz).
pub const CONTROL_LOOP_PERIOD: Duration = Duration::from_millis(20);

/// Outbound telemetry period (20 Hz).
pub const TELEMETRY_PERIOD: Duration = Duration::from_millis(50);
