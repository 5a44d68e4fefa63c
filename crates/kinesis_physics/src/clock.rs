//! Fixed-step clock
//!
//! Turns variable wall-clock frame deltas into a whole number of fixed
//! simulation steps. Leftover time is carried to the next frame; when a frame
//! would need more than `max_substeps` steps the surplus is dropped so a slow
//! frame cannot snowball into an ever longer one.

use crate::config::PhysicsConfig;

/// Accumulated time within this fraction of a step of a whole step counts as a step.
const RELATIVE_TOLERANCE: f64 = 1.0e-5;

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct SimClock {
    step: f64,
    tolerance: f64,
    max_substeps: u32,
    accumulator: f64,
    last_sample: Option<f64>,
    total_steps: u64,
    dropped_time: f64,
}

impl SimClock {
    /// Create a clock for a fixed step (seconds) and a per-frame step cap
    pub fn new(step: f32, max_substeps: u32) -> Self {
        let step = f64::from(step);
        Self {
            step,
            tolerance: step * RELATIVE_TOLERANCE,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            last_sample: None,
            total_steps: 0,
            dropped_time: 0.0,
        }
    }

    /// Create a clock matching a world configuration
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.timestep, config.max_substeps)
    }

    /// Fixed step in seconds
    pub fn step(&self) -> f32 {
        self.step as f32
    }

    /// Catch-up cap
    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    /// Add elapsed wall time and return how many fixed steps to run now
    ///
    /// Negative and non-finite deltas count as zero.
    pub fn advance(&mut self, delta: f64) -> u32 {
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }

        let mut steps = 0;
        while steps < self.max_substeps && self.accumulator + self.tolerance >= self.step {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            steps += 1;
        }

        // Past the cap everything left over is dropped, remainder included.
        if self.accumulator + self.tolerance >= self.step {
            log::debug!(
                "Frame needed more than {} steps, dropping {:.4}s of simulation time",
                self.max_substeps,
                self.accumulator
            );
            self.dropped_time += self.accumulator;
            self.accumulator = 0.0;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Advance to an absolute wall-clock timestamp in seconds
    ///
    /// The first sample only establishes the reference point and yields zero
    /// steps. A timestamp earlier than the previous one yields zero steps too.
    pub fn advance_to(&mut self, timestamp: f64) -> u32 {
        if !timestamp.is_finite() {
            return 0;
        }
        match self.last_sample.replace(timestamp) {
            Some(previous) => self.advance(timestamp - previous),
            None => 0,
        }
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0) as f32
    }

    /// Time carried over to the next frame
    pub fn accumulated(&self) -> f64 {
        self.accumulator
    }

    /// Steps handed out since creation or the last reset
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Simulated time handed out so far
    pub fn simulated_time(&self) -> f64 {
        self.total_steps as f64 * self.step
    }

    /// Wall time discarded by the catch-up cap
    pub fn dropped_time(&self) -> f64 {
        self.dropped_time
    }

    /// Forget accumulated time and the last wall-clock sample
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_sample = None;
        self.total_steps = 0;
        self.dropped_time = 0.0;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}
