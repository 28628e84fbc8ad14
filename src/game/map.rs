// Map description consumed by the character core
//
// The tile map itself is loaded elsewhere; this is the part the core needs:
// pixel bounds, blocking rectangles, and named layers of points.
//
// { "width": 3840, "height": 3840,
//   "obstacles": [ { "x": 0, "y": 0, "width": 64, "height": 3840 } ],
//   "layers": { "Zombie-spawns": [ { "x": 400, "y": 900 } ] },
//   "player_start": { "x": 1900, "y": 1900 } }

use crate::engine::physics::{ObstacleMap, Rect};
use anyhow::{Context, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Map description errors
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Malformed map {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Map {path} has invalid size {width}x{height}")]
    InvalidSize { path: String, width: f32, height: f32 },
}

/// A point object of a map layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: f32,
    pub y: f32,
}

impl MapPoint {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Map width in pixels
    pub width: f32,
    /// Map height in pixels
    pub height: f32,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    /// Point layers by name
    #[serde(default)]
    pub layers: HashMap<String, Vec<MapPoint>>,
    #[serde(default)]
    pub player_start: Option<MapPoint>,
}

impl MapData {
    /// Empty map of the given size
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            obstacles: Vec::new(),
            layers: HashMap::new(),
            player_start: None,
        }
    }

    pub fn with_obstacle(mut self, rect: Rect) -> Self {
        self.obstacles.push(rect);
        self
    }

    pub fn with_layer(mut self, name: &str, points: Vec<MapPoint>) -> Self {
        self.layers.insert(name.to_string(), points);
        self
    }

    pub fn with_player_start(mut self, position: Vec2) -> Self {
        self.player_start = Some(MapPoint {
            x: position.x,
            y: position.y,
        });
        self
    }

    /// Parse a map from a JSON string
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, MapError> {
        let map: Self = serde_json::from_str(json).map_err(|source| MapError::Parse {
            path: origin.to_string(),
            source,
        })?;

        if !(map.width > 0.0 && map.height > 0.0) {
            return Err(MapError::InvalidSize {
                path: origin.to_string(),
                width: map.width,
                height: map.height,
            });
        }
        Ok(map)
    }

    /// Load a map from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read map {}", path.display()))?;
        let map = Self::from_json_str(&json, &path.to_string_lossy())?;

        log::info!(
            "Loaded map {} ({}x{}, {} obstacles, {} layers)",
            path.display(),
            map.width,
            map.height,
            map.obstacles.len(),
            map.layers.len()
        );
        Ok(map)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Points of a layer; an absent layer is simply empty
    pub fn layer(&self, name: &str) -> &[MapPoint] {
        self.layers.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn obstacle_map(&self) -> ObstacleMap {
        ObstacleMap::from_rects(self.obstacles.iter().copied())
    }

    /// Where the player starts; the map centre unless set
    pub fn player_start(&self) -> Vec2 {
        self.player_start
            .map(|point| point.position())
            .unwrap_or_else(|| self.bounds().center())
    }

    /// Built-in arena: a walled square with a few inner walls and spawn points
    pub fn arena() -> Self {
        let size = 1920.0;
        let wall = 32.0;
        let spawns = [
            (160.0, 160.0),
            (1760.0, 160.0),
            (160.0, 1760.0),
            (1760.0, 1760.0),
            (960.0, 200.0),
            // Inside the centre block; rejected by validation
            (960.0, 960.0),
        ];

        Self::new(size, size)
            .with_obstacle(Rect::new(0.0, 0.0, size, wall))
            .with_obstacle(Rect::new(0.0, size - wall, size, wall))
            .with_obstacle(Rect::new(0.0, 0.0, wall, size))
            .with_obstacle(Rect::new(size - wall, 0.0, wall, size))
            .with_obstacle(Rect::new(880.0, 880.0, 160.0, 160.0))
            .with_obstacle(Rect::new(400.0, 500.0, 32.0, 600.0))
            .with_obstacle(Rect::new(1500.0, 800.0, 32.0, 600.0))
            .with_layer(
                crate::config::DEFAULT_SPAWN_LAYER,
                spawns.iter().map(|&(x, y)| MapPoint { x, y }).collect(),
            )
            .with_player_start(Vec2::new(960.0, 1400.0))
    }
}
