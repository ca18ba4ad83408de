//! Fixed-timestep clock

use crate::consts::{MAX_FRAME_MS, SIM_DT_MS};

/// Slack for timestamp differences that land a rounding error short of a tick
const TICK_EPSILON_MS: f64 = 1e-6;

/// Accumulates host frame time and hands out whole simulation ticks
///
/// The first timestamp only primes the clock. Gaps longer than the frame
/// cap (tab switches, debugger pauses) are clipped so the simulation never
/// tries to catch up on more than a few ticks at once.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    accumulator_ms: f64,
    max_frame_ms: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_FRAME_MS)
    }
}

impl FrameClock {
    pub fn new(max_frame_ms: f64) -> Self {
        Self {
            last_ms: None,
            accumulator_ms: 0.0,
            max_frame_ms,
        }
    }

    /// Feed a host timestamp (ms), returns the number of ticks due
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let elapsed = match self.last_ms {
            Some(last) => (now_ms - last).clamp(0.0, self.max_frame_ms),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        self.accumulator_ms += elapsed;

        let mut ticks = 0;
        while self.accumulator_ms >= SIM_DT_MS - TICK_EPSILON_MS {
            self.accumulator_ms = (self.accumulator_ms - SIM_DT_MS).max(0.0);
            ticks += 1;
        }
        ticks
    }

    /// Forget the last timestamp (after the page was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.accumulator_ms = 0.0;
    }
}
