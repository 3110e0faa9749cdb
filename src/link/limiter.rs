//! Token-bucket admission control.
//!
//! The bucket guards the whole inbound pipeline: a command that cannot
//! pay one token is dropped before any cryptographic work happens.

use std::time::Instant;

use crate::core::constants::{MAX_COMMAND_RATE, RATE_LIMIT_REFILL_INTERVAL};
use crate::core::error::AdmissionError;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Command admitted; one token consumed.
    Allowed,
    /// Bucket empty; command must not be processed further.
    Exceeded,
    /// Command blocked outright (reserved for blacklist policies).
    Blocked,
}

/// Admission counters for telemetry reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimiterStats {
    /// Tokens currently in the bucket.
    pub tokens: u16,
    /// Bucket capacity.
    pub capacity: u16,
    /// Commands admitted since construction or reset.
    pub total_allowed: u64,
    /// Commands refused since construction or reset.
    pub total_blocked: u64,
}

/// Token bucket with lazy, tick-quantized refill.
///
/// One token is restored per elapsed 10 ms tick. The refill timestamp
/// advances by exactly the ticks consumed, not to "now", so sub-tick
/// remainders carry over and bursty arrivals do not lose refill credit.
pub struct RateLimiter {
    tokens: u16,
    capacity: u16,
    last_refill: Instant,
    total_allowed: u64,
    total_blocked: u64,
    // Per-command-type caps: bookkeeping only, no enforcement.
    command_caps: [u16; 256],
}

impl RateLimiter {
    /// Create a full bucket with the given capacity.
    pub fn new(capacity: u16, now: Instant) -> Self {
        Self {
            tokens: capacity,
            capacity,
            last_refill: now,
            total_allowed: 0,
            total_blocked: 0,
            command_caps: [0; 256],
        }
    }

    /// Check whether a command may proceed, consuming one token if so.
    ///
    /// The command tag selects the per-type cap bookkeeping; admission
    /// itself is decided by the shared bucket.
    pub fn check_command(&mut self, _command: u8, now: Instant) -> Admission {
        self.refill(now);

        if self.tokens == 0 {
            self.total_blocked += 1;
            return Admission::Exceeded;
        }

        self.tokens -= 1;
        self.total_allowed += 1;
        Admission::Allowed
    }

    /// Restore whole elapsed ticks, capping at capacity.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        let interval_ms = RATE_LIMIT_REFILL_INTERVAL.as_millis();
        let ticks = elapsed.as_millis() / interval_ms;
        if ticks == 0 {
            return;
        }

        let restored = u16::try_from(ticks).unwrap_or(u16::MAX);
        self.tokens = self.tokens.saturating_add(restored).min(self.capacity);
        // Advance by the consumed ticks only; the remainder stays pending.
        self.last_refill += RATE_LIMIT_REFILL_INTERVAL * u32::try_from(ticks).unwrap_or(u32::MAX);
    }

    /// Tokens currently available.
    pub fn tokens(&self) -> u16 {
        self.tokens
    }

    /// Set a per-command-type cap. Values above 1000/s are rejected.
    ///
    /// Caps are recorded but not yet enforced by the bucket.
    pub fn set_command_cap(&mut self, command: u8, max_per_second: u16) -> Result<(), AdmissionError> {
        if max_per_second > MAX_COMMAND_RATE {
            return Err(AdmissionError::CapTooHigh(max_per_second));
        }
        self.command_caps[command as usize] = max_per_second;
        Ok(())
    }

    /// The recorded cap for a command type (0 = unlimited).
    pub fn command_cap(&self, command: u8) -> u16 {
        self.command_caps[command as usize]
    }

    /// Refill the bucket completely and clear the counters.
    pub fn reset(&mut self, now: Instant) {
        self.tokens = self.capacity;
        self.last_refill = now;
        self.total_allowed = 0;
        self.total_blocked = 0;
    }

    /// Current admission counters.
    pub fn stats(&self) -> RateLimiterStats {
        RateLimiterStats {
            tokens: self.tokens,
            capacity: self.capacity,
            total_allowed: self.total_allowed,
            total_blocked: self.total_blocked,
        }
    }
}
