//! Fixed-timestep scheduling, decoupled from the caller's frame rate

use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockState {
    #[default]
    Paused,
    Running,
}

/// Accumulates elapsed wall time as lag and converts it into whole
/// simulation steps.
///
/// A slow frame yields several catch-up steps in one drain, a fast frame
/// yields none. Lag is kept as a `Duration`, so the leftover after draining
/// is exact rather than subject to floating-point drift.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    state: ClockState,
    lag: Duration,
    last_tick_time: Option<Instant>,
}

impl FixedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Flip between paused and running, returning the new state
    pub fn toggle(&mut self) -> ClockState {
        self.state = match self.state {
            ClockState::Paused => ClockState::Running,
            ClockState::Running => ClockState::Paused,
        };
        self.state
    }

    pub fn lag(&self) -> Duration {
        self.lag
    }

    pub fn last_tick_time(&self) -> Option<Instant> {
        self.last_tick_time
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        self.lag = self.lag.saturating_add(elapsed);
    }

    /// Accumulate the wall time since the previous tick and remember `now`.
    /// The first tick only records the timestamp.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let elapsed = self
            .last_tick_time
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick_time = Some(now);
        self.accumulate(elapsed);
        elapsed
    }

    /// Consume whole steps of `step` from the lag, returning how many were
    /// consumed. A zero step consumes nothing.
    pub fn drain(&mut self, step: Duration) -> u32 {
        if step.is_zero() {
            warn!("drain called with a zero step duration");
            return 0;
        }

        let mut count = 0;
        while self.lag >= step {
            count += 1;
            self.lag -= step;
        }
        count
    }

    /// Discard accumulated lag, e.g. after a long pause in the caller
    pub fn reset_lag(&mut self) {
        self.lag = Duration::ZERO;
    }
}
