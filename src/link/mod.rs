//! The link engine: admission control, liveness, and the packet pipeline.

pub mod engine;
pub mod failsafe;
#[cfg(feature = "transport")]
pub mod intake;
pub mod limiter;

pub use engine::{CommandLink, LinkStats, Verdict};
pub use failsafe::{Failsafe, IndicatorPattern, LivenessState};
pub use limiter::{Admission, RateLimiter, RateLimiterStats};
