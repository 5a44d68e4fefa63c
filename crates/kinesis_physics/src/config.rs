//! Physics configuration
//!
//! A world reads its configuration once at construction and never changes it
//! afterwards.

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.82 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep for physics simulation
    pub timestep: f32,

    /// Maximum number of substeps per frame; extra accumulated time is dropped
    pub max_substeps: u32,

    /// Enable continuous collision detection
    pub ccd_enabled: bool,

    /// Friction used when no contact material is registered for a pair
    pub default_friction: f32,

    /// Restitution used when no contact material is registered for a pair
    pub default_restitution: f32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Enable sleeping for inactive bodies
    pub sleeping_enabled: bool,

    /// Linear speed below which a body may fall asleep (m/s)
    pub sleep_linear_threshold: f32,

    /// Angular speed below which a body may fall asleep (rad/s)
    pub sleep_angular_threshold: f32,

    /// How long a body must stay under both thresholds before sleeping (s)
    pub sleep_time: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.82, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 3,
            ccd_enabled: false,
            default_friction: 0.3,
            default_restitution: 0.3,
            velocity_iterations: 4,
            sleeping_enabled: true,
            sleep_linear_threshold: 0.1,
            sleep_angular_threshold: 0.1,
            sleep_time: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Create a configuration for high-precision simulation
    pub fn high_precision() -> Self {
        Self {
            velocity_iterations: 8,
            max_substeps: 5,
            ..Default::default()
        }
    }

    /// Create a configuration for fast simulation (lower quality)
    pub fn fast() -> Self {
        Self {
            velocity_iterations: 2,
            max_substeps: 2,
            ..Default::default()
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the catch-up cap
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Set the default contact coefficients
    pub fn with_default_contact(mut self, friction: f32, restitution: f32) -> Self {
        self.default_friction = friction;
        self.default_restitution = restitution;
        self
    }

    /// Toggle sleeping
    pub fn with_sleeping(mut self, enabled: bool) -> Self {
        self.sleeping_enabled = enabled;
        self
    }

    /// Set the sleep hysteresis
    pub fn with_sleep_thresholds(mut self, linear: f32, angular: f32, time: f32) -> Self {
        self.sleep_linear_threshold = linear;
        self.sleep_angular_threshold = angular;
        self.sleep_time = time;
        self
    }

    /// Check that the configuration can drive a world
    pub fn validate(&self) -> Result<()> {
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::InvalidConfig("max_substeps must be at least 1".into()));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".into(),
            ));
        }
        if !self.default_friction.is_finite() || !self.default_restitution.is_finite() {
            return Err(PhysicsError::InvalidConfig(
                "default contact coefficients must be finite".into(),
            ));
        }
        let sleep = [
            self.sleep_linear_threshold,
            self.sleep_angular_threshold,
            self.sleep_time,
        ];
        if sleep.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PhysicsError::InvalidConfig(
                "sleep thresholds must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
