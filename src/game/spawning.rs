// Zombie spawn point management
//
// Spawn points come from a named map layer, are validated once against the
// obstacles, and are picked for each batch with inverse-usage weighting so
// rarely used points are preferred.

use crate::config::GameSettings;
use crate::core::math::symmetric_jitter;
use crate::engine::physics::{ObstacleMap, Rect};
use crate::game::map::MapData;
use glam::Vec2;

/// One candidate spawn location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Vec2,
    pub is_valid: bool,
    pub usage_count: u32,
    /// Game time of the last selection
    pub last_used: f32,
}

impl SpawnPoint {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            is_valid: true,
            usage_count: 0,
            last_used: 0.0,
        }
    }

    /// Selection weight; falls as the point gets used
    pub fn weight(&self) -> f32 {
        1.0 / (self.usage_count as f32 + 1.0)
    }
}

/// Spawn point usage summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnStats {
    pub total_points: usize,
    pub valid_points: usize,
    pub total_usage: u32,
    pub average_usage: f32,
}

/// Positions picked for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnBatch {
    pub positions: Vec<Vec2>,
    /// False when no valid spawn point existed and positions are random
    pub from_spawn_points: bool,
}

#[derive(Debug)]
pub struct SpawnManager {
    points: Vec<SpawnPoint>,
    bounds: Rect,
    layer: String,
    cooldown: f32,
    box_size: Vec2,
    jitter: f32,
    margin: f32,
    rng: fastrand::Rng,
}

impl SpawnManager {
    pub fn new(settings: &GameSettings, bounds: Rect, seed: u64) -> Self {
        Self {
            points: Vec::new(),
            bounds,
            layer: settings.spawn_layer.clone(),
            cooldown: settings.spawn_cooldown,
            box_size: Vec2::splat(settings.spawn_box_size),
            jitter: settings.spawn_jitter,
            margin: settings.spawn_margin,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn points(&self) -> &[SpawnPoint] {
        &self.points
    }

    /// Read the spawn layer of `map`; a map without the layer has no points
    pub fn load_spawn_points(&self, map: &MapData) -> Vec<SpawnPoint> {
        let layer = map.layer(&self.layer);
        if layer.is_empty() {
            log::warn!("Map has no '{}' layer, spawns will be random", self.layer);
        } else {
            log::info!("Found {} spawn points in '{}'", layer.len(), self.layer);
        }
        layer.iter().map(|point| SpawnPoint::new(point.position())).collect()
    }

    /// Mark points whose spawn box overlaps an obstacle as invalid.
    /// Returns the number of valid points.
    pub fn validate(&mut self, obstacles: &ObstacleMap) -> usize {
        for point in &mut self.points {
            point.is_valid = !obstacles.overlaps_box(point.position, self.box_size);
            if !point.is_valid {
                log::warn!(
                    "Invalid spawn point at ({:.1}, {:.1}): inside an obstacle",
                    point.position.x,
                    point.position.y
                );
            }
        }

        let valid = self.valid_count();
        log::info!("Validated {}/{} spawn points", valid, self.points.len());
        valid
    }

    /// Load and validate the spawn points of a new map
    pub fn setup_for_map(&mut self, map: &MapData, obstacles: &ObstacleMap) {
        self.bounds = map.bounds();
        self.points = self.load_spawn_points(map);
        let valid = self.validate(obstacles);
        log::info!("Spawn setup complete: {} valid spawn points", valid);
    }

    fn valid_count(&self) -> usize {
        self.points.iter().filter(|point| point.is_valid).count()
    }

    /// Pick positions for `count` spawns at game time `now`
    ///
    /// Uses at most one position per point; with fewer valid points than
    /// `count` the batch is smaller. Without any valid point every position
    /// is random.
    pub fn select_spawns(&mut self, count: usize, now: f32) -> SpawnBatch {
        let valid: Vec<usize> = (0..self.points.len())
            .filter(|&i| self.points[i].is_valid)
            .collect();

        if valid.is_empty() {
            log::warn!("No valid spawn points, using {} random positions", count);
            return SpawnBatch {
                positions: self.random_positions(count),
                from_spawn_points: false,
            };
        }

        // Cooldown is advisory: widen back to every valid point if needed
        let mut candidates: Vec<usize> = valid
            .iter()
            .copied()
            .filter(|&i| now - self.points[i].last_used >= self.cooldown)
            .collect();
        if candidates.len() < count {
            log::debug!(
                "Only {} spawn points off cooldown, using all {} valid points",
                candidates.len(),
                valid.len()
            );
            candidates = valid;
        }

        let picks = count.min(candidates.len());
        let mut positions = Vec::with_capacity(picks);

        for _ in 0..picks {
            let slot = self.weighted_pick(&candidates);
            let index = candidates.swap_remove(slot);

            let offset = Vec2::new(
                symmetric_jitter(&mut self.rng, self.jitter),
                symmetric_jitter(&mut self.rng, self.jitter),
            );
            let point = &mut self.points[index];
            // Edge points must not be jittered off the map
            positions.push((point.position + offset).clamp(self.bounds.min(), self.bounds.max()));
            point.usage_count += 1;
            point.last_used = now;
        }

        SpawnBatch {
            positions,
            from_spawn_points: true,
        }
    }

    /// Index into `candidates`, weighted by inverse usage
    fn weighted_pick(&mut self, candidates: &[usize]) -> usize {
        let total: f32 = candidates.iter().map(|&i| self.points[i].weight()).sum();
        if total <= 0.0 {
            return self.rng.usize(..candidates.len());
        }

        let mut roll = self.rng.f32() * total;
        for (slot, &i) in candidates.iter().enumerate() {
            roll -= self.points[i].weight();
            if roll < 0.0 {
                return slot;
            }
        }
        // Rounding left a sliver of weight unclaimed
        candidates.len() - 1
    }

    /// Uniform positions inside the bounds, away from the edges
    fn random_positions(&mut self, count: usize) -> Vec<Vec2> {
        let min = self.bounds.min();
        let max = self.bounds.max();
        let margin_x = self.margin.min(self.bounds.width / 2.0);
        let margin_y = self.margin.min(self.bounds.height / 2.0);

        (0..count)
            .map(|_| {
                let lo = Vec2::new(min.x + margin_x, min.y + margin_y);
                let hi = Vec2::new(max.x - margin_x, max.y - margin_y);
                Vec2::new(
                    lo.x + self.rng.f32() * (hi.x - lo.x),
                    lo.y + self.rng.f32() * (hi.y - lo.y),
                )
            })
            .collect()
    }

    pub fn stats(&self) -> SpawnStats {
        let total_usage: u32 = self.points.iter().map(|point| point.usage_count).sum();
        SpawnStats {
            total_points: self.points.len(),
            valid_points: self.valid_count(),
            total_usage,
            average_usage: if self.points.is_empty() {
                0.0
            } else {
                total_usage as f32 / self.points.len() as f32
            },
        }
    }

    /// Drop every point, e.g. when the map is unloaded
    pub fn clear(&mut self) {
        self.points.clear();
    }
}
