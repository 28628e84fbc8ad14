// Game-wide tuning settings
//
// Every field has a default so a settings file only needs to name the values it
// changes. A missing file means "use the defaults".

use crate::game::characters::stats::{CharacterStats, PLAYER_STATS, ZOMBIE_STATS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the map object layer holding zombie spawn points
pub const DEFAULT_SPAWN_LAYER: &str = "Zombie-spawns";

/// Settings loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed settings {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// All tuning constants of the behavior core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Animation playback rate shared by every clip
    pub animation_fps: f32,
    /// Speed below which a character counts as standing still
    pub dead_zone: f32,
    /// Minimum time between two path searches of one enemy (seconds)
    pub pathfind_delay: f32,
    /// Time between two wander target refreshes (seconds)
    pub wander_interval: f32,
    /// Maximum per-axis offset of a wander target
    pub wander_radius: f32,
    /// Side length of a walkability grid cell
    pub grid_cell_size: f32,
    /// Minimum time before a spawn point is preferred again (seconds)
    pub spawn_cooldown: f32,
    /// Size of the box checked against obstacles when validating spawns
    pub spawn_box_size: f32,
    /// Maximum per-axis jitter applied to a selected spawn point
    pub spawn_jitter: f32,
    /// Distance kept from the map edge by random fallback spawns
    pub spawn_margin: f32,
    /// Map object layer holding spawn points
    pub spawn_layer: String,
    pub player: CharacterStats,
    pub zombie: CharacterStats,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            animation_fps: 10.0,
            dead_zone: 0.1,
            pathfind_delay: 1.0,
            wander_interval: 3.0,
            wander_radius: 1000.0,
            grid_cell_size: 30.0,
            spawn_cooldown: 5.0,
            spawn_box_size: 32.0,
            spawn_jitter: 10.0,
            spawn_margin: 50.0,
            spawn_layer: DEFAULT_SPAWN_LAYER.to_string(),
            player: PLAYER_STATS,
            zombie: ZOMBIE_STATS,
        }
    }
}

impl GameSettings {
    /// Parse settings from a JSON string
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Load settings from a JSON file, falling back to defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.to_string_lossy().to_string();

        if !path.exists() {
            log::info!("No settings at {}, using defaults", display);
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let settings = Self::from_json_str(&json, &display)?;
        log::info!("Loaded settings from {}", display);
        Ok(settings)
    }

    /// Duration of a single animation frame in seconds
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.animation_fps
    }
}
