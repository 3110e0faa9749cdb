//! Wire formats: frame layouts, CRC-16, and structural validation.
//!
//! The codec is deliberately dumb: it moves bytes and checks structure.
//! Whether a frame may act on the vehicle is decided by [`crate::link`].

mod crc;
mod frame;

pub use crc::crc16;
pub use frame::{
    ControlFrame, ControlValues, FrameKind, FrameSecurity, HandshakeFrame, HandshakeKind,
    TelemetryFrame, VehicleKind, classify,
};
