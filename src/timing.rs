//! Sampling-interval gate.
//!
//! The scheduler loop runs as fast as the link allows; the gate throttles
//! feature-window pushes to the configured rate. The interval is a minimum,
//! not a deadline: when a tick runs long the gate simply fires late and
//! re-arms from the actual fire time, so overruns shift the schedule rather
//! than being compensated.

/// Minimum-interval gate over a caller-supplied monotonic clock.
pub struct SampleClock {
    interval_us: u64,
    last_fire_us: u64,
}

impl SampleClock {
    pub fn new(interval_us: u64) -> Self {
        Self {
            interval_us,
            last_fire_us: 0,
        }
    }

    /// Returns `true` when the interval has elapsed, re-arming from `now_us`.
    pub fn poll(&mut self, now_us: u64) -> bool {
        if now_us.wrapping_sub(self.last_fire_us) >= self.interval_us {
            self.last_fire_us = now_us;
            return true;
        }
        false
    }

    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }
}
