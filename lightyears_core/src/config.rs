//! Engine configuration
//!
//! Loaded from TOML or YAML (picked by file extension). Every field has a
//! default, so partial files are valid.

use crate::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowConfig,
    /// Fixed simulation rate in steps per second
    pub target_framerate: f32,
    /// Seconds of simulated time between cleanup cycles
    pub clean_cycle_interval: f32,
    /// Upper bound on a single real-time delta fed to the accumulator
    pub max_frame_time: f32,
    pub physics: PhysicsConfig,
    /// Directory textures are resolved against
    pub asset_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Physics units per render unit
    pub scale: f32,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    /// Gravity in physics units, zero for the top-down view
    pub gravity: [f32; 2],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            target_framerate: 60.0,
            clean_cycle_interval: 2.0,
            max_frame_time: 0.25,
            physics: PhysicsConfig::default(),
            asset_root: PathBuf::from("assets"),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 980,
            title: "Light Years".to_string(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            scale: 0.01,
            velocity_iterations: 8,
            position_iterations: 3,
            gravity: [0.0, 0.0],
        }
    }
}

impl EngineConfig {
    /// Load a config file, auto-detecting the format from its extension
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            // Default to YAML for .yaml, .yml, or no extension
            _ => serde_yaml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Length of one fixed simulation step in seconds
    pub fn target_delta_time(&self) -> f32 {
        1.0 / self.target_framerate
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "window must have non-zero extents, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !is_positive(self.target_framerate) {
            return Err(GameError::InvalidConfig(
                "target_framerate must be positive".to_string(),
            ));
        }
        if !is_positive(self.clean_cycle_interval) {
            return Err(GameError::InvalidConfig(
                "clean_cycle_interval must be positive".to_string(),
            ));
        }
        if !is_positive(self.max_frame_time) {
            return Err(GameError::InvalidConfig(
                "max_frame_time must be positive".to_string(),
            ));
        }
        self.physics.validate()
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> GameResult<()> {
        if !is_positive(self.scale) {
            return Err(GameError::InvalidConfig(
                "physics.scale must be positive".to_string(),
            ));
        }
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(GameError::InvalidConfig(
                "physics iteration counts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
