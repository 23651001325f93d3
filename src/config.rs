//! Simulation tunables
//!
//! Persisted as JSON. Missing fields fall back to the reference-build values,
//! so a partial file only overrides what it names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Widest aim jitter, a half turn either way
pub const MAX_AIM_JITTER: i32 = 180;

/// Simulation tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === World ===
    /// World width in pixels
    pub world_width: i32,
    /// World height in pixels
    pub world_height: i32,
    /// Horizontal toroidal wrap
    pub wraps: bool,

    // === View ===
    /// Visible playfield width (bunkers outside it never fire)
    pub view_width: i32,
    /// Visible playfield height
    pub view_height: i32,

    // === Projectiles ===
    /// Ship shot lifetime in frames
    pub ship_shot_life: i32,
    /// Bunker shot lifetime in frames
    pub bunker_shot_life: i32,
    /// Bunker shot speed in 1/8 px per frame
    pub bunker_shot_speed: i32,

    // === Bunkers ===
    /// Chance (percent) per tick that some bunker fires
    pub bunker_fire_chance: u32,
    /// Aim jitter in degrees (uniform in [-jitter, +jitter])
    pub bunker_aim_jitter: i32,
    /// Ticks between follow-turret facing steps
    pub follow_turn_interval: u32,

    // === Ship ===
    /// Thrust scale in eighths of a shot vector
    pub thrust_scale: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 1000,
            world_height: 600,
            wraps: false,

            view_width: 512,
            view_height: 318,

            ship_shot_life: 35,
            bunker_shot_life: 30,
            bunker_shot_speed: 48,

            bunker_fire_chance: 12,
            bunker_aim_jitter: 8,
            follow_turn_interval: 4,

            thrust_scale: 2,
        }
    }
}

impl SimConfig {
    /// Parse from a JSON string and validate
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.world_width <= 0 || self.world_height <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "world must have positive extents, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.view_width <= 0 || self.view_height <= 0 {
            return Err(SimError::InvalidConfig(format!(
                "view must have positive extents, got {}x{}",
                self.view_width, self.view_height
            )));
        }
        if self.ship_shot_life < 0 || self.bunker_shot_life < 0 {
            return Err(SimError::InvalidConfig(
                "shot lifetimes must not be negative".into(),
            ));
        }
        if self.bunker_fire_chance > 100 {
            return Err(SimError::InvalidConfig(format!(
                "bunker_fire_chance is a percentage, got {}",
                self.bunker_fire_chance
            )));
        }
        if !(0..=MAX_AIM_JITTER).contains(&self.bunker_aim_jitter) {
            return Err(SimError::InvalidConfig(format!(
                "bunker_aim_jitter must be within 0..={}, got {}",
                MAX_AIM_JITTER, self.bunker_aim_jitter
            )));
        }
        Ok(())
    }
}
