//! Core constants, configuration, and error types.

pub mod config;
pub mod constants;
pub mod error;

pub use config::SecurityConfig;
pub use constants::*;
pub use error::{
    AdmissionError, CryptoError, ExchangeError, FrameError, LinkError, RejectReason,
};
