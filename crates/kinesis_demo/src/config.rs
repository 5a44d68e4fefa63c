//! Demo configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `KINESIS_FRAMES=900`, `KINESIS_IMPULSE=12`, ...
//! 2. Config file named by `KINESIS_CONFIG`, else the first positional
//!    argument, else `kinesis.toml` in the working directory
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [sim.physics]
//! gravity = [0.0, -9.82, 0.0]
//! max_substeps = 3
//!
//! [sim.interaction]
//! impulse_strength = 8.0
//!
//! [script]
//! frames = 600
//! jitter = 0.4
//! click_frame = 240
//! ```

use kinesis_scene::{Result, SimConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scripted run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Frames to run
    pub frames: u32,
    /// Nominal frame time in seconds
    pub frame_time: f64,
    /// Frame time variation as a fraction of `frame_time`
    pub jitter: f64,
    /// Impacts slower than this (m/s) make no sound
    pub impact_threshold: f32,
    /// Frame at which the scripted click fires at the sphere
    pub click_frame: u32,
    /// Boxes in the stack
    pub box_count: u32,
    /// Restitution between the sphere and the ground
    pub sphere_restitution: f32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 60.0,
            jitter: 0.4,
            impact_threshold: 1.5,
            click_frame: 240,
            box_count: 4,
            sphere_restitution: 0.7,
        }
    }
}

/// Complete demo configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub sim: SimConfig,
    pub script: ScriptConfig,
    /// Where the configuration was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl DemoConfig {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let path = std::env::var("KINESIS_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::args()
                    .skip(1)
                    .find(|arg| !arg.starts_with("--"))
                    .map(PathBuf::from)
            });

        let mut config = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                let fallback = Path::new("kinesis.toml");
                if fallback.exists() {
                    Self::load_from_file(fallback)?
                } else {
                    log::info!("No config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded demo config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Apply `KINESIS_*` overrides; unparsable values are logged and ignored
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parse<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            match value.trim().parse() {
                Ok(parsed) => {
                    log::info!("{} from env: {}", key, value);
                    Some(parsed)
                }
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a valid value", key, value);
                    None
                }
            }
        }

        if let Some(frames) = parse("KINESIS_FRAMES", lookup("KINESIS_FRAMES")) {
            self.script.frames = frames;
        }
        if let Some(jitter) = parse("KINESIS_JITTER", lookup("KINESIS_JITTER")) {
            self.script.jitter = jitter;
        }
        if let Some(threshold) = parse("KINESIS_IMPACT_THRESHOLD", lookup("KINESIS_IMPACT_THRESHOLD")) {
            self.script.impact_threshold = threshold;
        }
        if let Some(timestep) = parse("KINESIS_TIMESTEP", lookup("KINESIS_TIMESTEP")) {
            self.sim.physics.timestep = timestep;
        }
        if let Some(max_substeps) = parse("KINESIS_MAX_SUBSTEPS", lookup("KINESIS_MAX_SUBSTEPS")) {
            self.sim.physics.max_substeps = max_substeps;
        }
        if let Some(gravity_y) = parse("KINESIS_GRAVITY_Y", lookup("KINESIS_GRAVITY_Y")) {
            self.sim.physics.gravity[1] = gravity_y;
        }
        if let Some(impulse) = parse("KINESIS_IMPULSE", lookup("KINESIS_IMPULSE")) {
            self.sim.interaction.impulse_strength = impulse;
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Demo configuration:");
        match &self.config_path {
            Some(path) => log::info!("  Source:     {}", path.display()),
            None => log::info!("  Source:     defaults"),
        }
        log::info!("  Frames:     {} @ {:.4}s (±{:.0}%)", self.script.frames, self.script.frame_time, self.script.jitter * 100.0);
        log::info!("  Timestep:   {:.4}s, max {} substeps", self.sim.physics.timestep, self.sim.physics.max_substeps);
        log::info!("  Gravity:    {:?}", self.sim.physics.gravity);
        log::info!("  Impulse:    {}", self.sim.interaction.impulse_strength);
        log::info!("  Click at:   frame {}", self.script.click_frame);
    }
}
