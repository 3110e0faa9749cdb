//! Link-liveness failsafe state machine.
//!
//! Liveness is a pure function of elapsed time since the last
//! *authenticated* packet. A forged or corrupted frame counts as an
//! authentication failure and must never keep the link alive.

use std::time::{Duration, Instant};

use tracing::info;

use crate::core::constants::{
    FAILSAFE_THRESHOLD, INDICATOR_ARMED_PERIOD, INDICATOR_EMERGENCY_PERIOD,
    INDICATOR_SIGNAL_LOSS_PERIOD, SIGNAL_LOSS_THRESHOLD,
};

/// Link liveness states, in order of escalating severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LivenessState {
    /// Powered up, no update yet.
    Idle,
    /// Authenticated traffic within the signal-loss threshold.
    Armed,
    /// Gap between 500 ms and 2 s: warning, hold last good controls.
    SignalLoss,
    /// Gap above 2 s: failsafe active, control output must be zeroed.
    Emergency,
}

impl LivenessState {
    /// Human-readable state name for logs and telemetry.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Armed => "ARMED",
            Self::SignalLoss => "SIGNAL_LOSS",
            Self::Emergency => "EMERGENCY",
        }
    }
}

/// Operator-visible indicator pattern; blink rate rises with severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorPattern {
    /// Steady off.
    Off,
    /// 1 Hz half-period blink.
    SlowBlink,
    /// 200 ms half-period blink.
    MediumBlink,
    /// 100 ms half-period blink.
    FastBlink,
}

/// Failsafe state machine.
///
/// Driven by the control loop via [`update`](Self::update); fed by the
/// pipeline via [`record_packet`](Self::record_packet).
pub struct Failsafe {
    state: LivenessState,
    previous: LivenessState,
    epoch: Instant,
    last_valid_packet: Instant,
    last_transition: Instant,
    total_packets: u64,
    invalid_packets: u64,
}

impl Failsafe {
    /// Create the state machine; the liveness clock starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            state: LivenessState::Idle,
            previous: LivenessState::Idle,
            epoch: now,
            last_valid_packet: now,
            last_transition: now,
            total_packets: 0,
            invalid_packets: 0,
        }
    }

    /// Record an inbound packet.
    ///
    /// Only an authenticated packet refreshes the liveness timer. A failed
    /// packet still proves a transmitter exists, so it is counted, but it
    /// must not delay the failsafe.
    pub fn record_packet(&mut self, now: Instant, authenticated: bool) {
        self.total_packets += 1;
        if !authenticated {
            self.invalid_packets += 1;
            return;
        }
        self.last_valid_packet = now;
    }

    /// Recompute the state from elapsed time; log any transition.
    pub fn update(&mut self, now: Instant) {
        let gap = now.saturating_duration_since(self.last_valid_packet);

        let new_state = if gap < SIGNAL_LOSS_THRESHOLD {
            LivenessState::Armed
        } else if gap < FAILSAFE_THRESHOLD {
            LivenessState::SignalLoss
        } else {
            LivenessState::Emergency
        };

        if new_state != self.state {
            self.previous = self.state;
            self.state = new_state;
            self.last_transition = now;
            info!(
                previous = self.previous.as_str(),
                current = self.state.as_str(),
                gap_ms = gap.as_millis() as u64,
                invalid_packets = self.invalid_packets,
                "failsafe state change"
            );
        }
    }

    /// Current liveness state.
    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// State held before the most recent transition.
    pub fn previous_state(&self) -> LivenessState {
        self.previous
    }

    /// Time since the last authenticated packet.
    pub fn time_since_last_packet(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_valid_packet)
    }

    /// True while authenticated traffic is current.
    pub fn is_armed(&self) -> bool {
        self.state == LivenessState::Armed
    }

    /// True in the signal-loss warning band.
    pub fn is_signal_lost(&self) -> bool {
        self.state == LivenessState::SignalLoss
    }

    /// True only in emergency; control output must be suppressed.
    pub fn is_failsafe_active(&self) -> bool {
        self.state == LivenessState::Emergency
    }

    /// Packets seen since construction.
    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Packets that failed authentication since construction.
    pub fn invalid_packets(&self) -> u64 {
        self.invalid_packets
    }

    /// Indicator pattern for the current state.
    pub fn indicator_pattern(&self) -> IndicatorPattern {
        match self.state {
            LivenessState::Idle => IndicatorPattern::Off,
            LivenessState::Armed => IndicatorPattern::SlowBlink,
            LivenessState::SignalLoss => IndicatorPattern::MediumBlink,
            LivenessState::Emergency => IndicatorPattern::FastBlink,
        }
    }

    /// Whether the indicator is lit at `now`, per the blink pattern.
    pub fn indicator_lit(&self, now: Instant) -> bool {
        let period = match self.indicator_pattern() {
            IndicatorPattern::Off => return false,
            IndicatorPattern::SlowBlink => INDICATOR_ARMED_PERIOD,
            IndicatorPattern::MediumBlink => INDICATOR_SIGNAL_LOSS_PERIOD,
            IndicatorPattern::FastBlink => INDICATOR_EMERGENCY_PERIOD,
        };
        let elapsed = now.saturating_duration_since(self.epoch);
        (elapsed.as_millis() / period.as_millis()) % 2 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_then_arms() {
        let now = Instant::now();
        let mut failsafe = Failsafe::new(now);
        assert_eq!(failsafe.state(), LivenessState::Idle);
        assert_eq!(failsafe.indicator_pattern(), IndicatorPattern::Off);

        failsafe.update(now);
        assert!(failsafe.is_armed());
    }

    #[test]
    fn test_threshold_schedule() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);
        failsafe.record_packet(start, true);

        failsafe.update(start + Duration::from_millis(499));
        assert_eq!(failsafe.state(), LivenessState::Armed);

        failsafe.update(start + Duration::from_millis(600));
        assert_eq!(failsafe.state(), LivenessState::SignalLoss);
        assert!(failsafe.is_signal_lost());
        assert!(!failsafe.is_failsafe_active());

        // Another 1600 ms (2200 ms total) crosses into emergency.
        failsafe.update(start + Duration::from_millis(2200));
        assert_eq!(failsafe.state(), LivenessState::Emergency);
        assert!(failsafe.is_failsafe_active());
        assert_eq!(failsafe.previous_state(), LivenessState::SignalLoss);
    }

    #[test]
    fn test_authenticated_packet_refreshes_timer() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);

        failsafe.record_packet(start + Duration::from_millis(400), true);
        failsafe.update(start + Duration::from_millis(600));
        assert_eq!(failsafe.state(), LivenessState::Armed);
    }

    #[test]
    fn test_failed_authentication_does_not_refresh_timer() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);
        failsafe.record_packet(start, true);

        // A forged packet at 100 ms must not move the schedule.
        failsafe.record_packet(start + Duration::from_millis(100), false);
        failsafe.update(start + Duration::from_millis(600));
        assert_eq!(failsafe.state(), LivenessState::SignalLoss);
        assert_eq!(failsafe.invalid_packets(), 1);
        assert_eq!(failsafe.total_packets(), 2);
    }

    #[test]
    fn test_recovery_from_emergency() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);
        failsafe.update(start + Duration::from_millis(3000));
        assert!(failsafe.is_failsafe_active());

        let rejoin = start + Duration::from_millis(3100);
        failsafe.record_packet(rejoin, true);
        failsafe.update(rejoin);
        assert!(failsafe.is_armed());
    }

    #[test]
    fn test_indicator_rates_by_state() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);

        failsafe.update(start);
        assert_eq!(failsafe.indicator_pattern(), IndicatorPattern::SlowBlink);
        // Armed: 1000 ms half-period.
        assert!(failsafe.indicator_lit(start + Duration::from_millis(100)));
        assert!(!failsafe.indicator_lit(start + Duration::from_millis(1100)));

        failsafe.update(start + Duration::from_millis(600));
        assert_eq!(failsafe.indicator_pattern(), IndicatorPattern::MediumBlink);

        failsafe.update(start + Duration::from_millis(2500));
        assert_eq!(failsafe.indicator_pattern(), IndicatorPattern::FastBlink);
        // Emergency: 100 ms half-period.
        assert!(failsafe.indicator_lit(start + Duration::from_millis(2600)));
        assert!(!failsafe.indicator_lit(start + Duration::from_millis(2710)));
    }

    #[test]
    fn test_time_since_last_packet() {
        let start = Instant::now();
        let mut failsafe = Failsafe::new(start);
        failsafe.record_packet(start + Duration::from_millis(50), true);
        assert_eq!(
            failsafe.time_since_last_packet(start + Duration::from_millis(250)),
            Duration::from_millis(200)
        );
    }
}
