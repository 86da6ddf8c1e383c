//! Game setup values
//!
//! Read once at start-up (JSON) and fixed for the rest of the run. Physics
//! constants are not here, they live in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult, require_positive};

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Universe ===
    /// Universe width in world units
    pub universe_width: f32,
    /// Universe height in world units
    pub universe_height: f32,
    /// Asteroid belts created for a new game
    pub belts: u32,
    /// Rocks spread across all belts for a new game
    pub rocks: u32,

    // === Viewport ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Run ===
    /// Seed for every random draw in the run
    pub seed: u64,
    /// Money the player starts with
    pub starting_money: u32,
    pub starting_lives: u32,
    /// Money step at which an extra life is awarded
    pub extra_life_step: u32,
    /// Ticks between saucer spawn attempts
    pub saucer_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            universe_width: 20000.0,
            universe_height: 20000.0,
            belts: 8,
            rocks: 120,

            screen_width: 1024.0,
            screen_height: 768.0,

            seed: 0,
            starting_money: 1000,
            starting_lives: 5,
            extra_life_step: 10000,
            saucer_interval: 2000,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject dimensions the universe and camera cannot work with
    pub fn validate(&self) -> SimResult<()> {
        require_positive("universe_width", self.universe_width)?;
        require_positive("universe_height", self.universe_height)?;
        require_positive("screen_width", self.screen_width)?;
        require_positive("screen_height", self.screen_height)?;
        if self.screen_width > self.universe_width {
            return Err(SimError::UnsafeConstant {
                name: "screen_width",
                value: self.screen_width,
                safe_range: "(0.0, universe_width]",
            });
        }
        if self.screen_height > self.universe_height {
            return Err(SimError::UnsafeConstant {
                name: "screen_height",
                value: self.screen_height,
                safe_range: "(0.0, universe_height]",
            });
        }
        Ok(())
    }

    /// Centre of the universe (spawn point)
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.universe_width / 2.0, self.universe_height / 2.0)
    }
}
