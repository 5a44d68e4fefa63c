//! Simulation context configuration
//!
//! # Example Config File
//!
//! ```toml
//! [physics]
//! gravity = [0.0, -9.82, 0.0]
//! timestep = 0.016666668
//! max_substeps = 3
//!
//! [interaction]
//! impulse_strength = 8.0
//! ```

use crate::error::Result;
use crate::picking::InteractionConfig;
use kinesis_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a [`SimContext`](crate::SimContext) is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
}

impl SimConfig {
    /// Parse from TOML; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded simulation config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }
}
