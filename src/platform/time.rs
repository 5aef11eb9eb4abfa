//! Frame timing
//!
//! The wheel only ever advances in whole `FRAME_MS` steps. `FrameClock`
//! accumulates real elapsed time and reports how many steps to run, capped at
//! `MAX_SUBSTEPS` so a long stall cannot trigger a catch-up storm.

use std::time::Instant;

use crate::consts::{FRAME_MS, MAX_SUBSTEPS};

/// Source of monotonic time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ms: f64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms.max(0.0);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Fixed-step accumulator
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current time, get the number of frames to simulate
    pub fn frames_due(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        // Clamp huge gaps (tab in background, debugger pause)
        self.accumulator += dt.min(100.0);

        let mut substeps = 0;
        while self.accumulator >= FRAME_MS && substeps < MAX_SUBSTEPS {
            self.accumulator -= FRAME_MS;
            substeps += 1;
        }
        substeps
    }

    /// Leftover fraction of a frame, for interpolation
    pub fn alpha(&self) -> f64 {
        (self.accumulator / FRAME_MS).clamp(0.0, 1.0)
    }
}
