// Static obstacle geometry and overlap queries

use glam::Vec2;
use parry2d::bounding_volume::{Aabb, BoundingVolume};
use parry2d::math::{Point, Vector};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle given by its lower-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.x && point.x <= max.x && point.y >= self.y && point.y <= max.y
    }

    fn to_aabb(self) -> Aabb {
        let max = self.max();
        Aabb::new(Point::new(self.x, self.y), Point::new(max.x, max.y))
    }
}

/// Blocking geometry of a map, queried with world-space boxes
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    boxes: Vec<Aabb>,
}

impl ObstacleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rects<I: IntoIterator<Item = Rect>>(rects: I) -> Self {
        let mut map = Self::new();
        for rect in rects {
            map.add(rect);
        }
        map
    }

    pub fn add(&mut self, rect: Rect) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            log::warn!("Ignoring degenerate obstacle {:?}", rect);
            return;
        }
        self.boxes.push(rect.to_aabb());
    }

    /// Whether a box of `size` centred on `center` touches any obstacle
    pub fn overlaps_box(&self, center: Vec2, size: Vec2) -> bool {
        let probe = Aabb::from_half_extents(
            Point::new(center.x, center.y),
            Vector::new(size.x / 2.0, size.y / 2.0),
        );
        self.boxes.iter().any(|obstacle| obstacle.intersects(&probe))
    }

    /// Whether `rect` touches any obstacle
    pub fn overlaps(&self, rect: Rect) -> bool {
        let probe = rect.to_aabb();
        self.boxes.iter().any(|obstacle| obstacle.intersects(&probe))
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> ObstacleMap {
        ObstacleMap::from_rects([Rect::new(100.0, 0.0, 20.0, 200.0)])
    }

    #[test]
    fn test_box_overlap() {
        let map = wall();
        assert!(map.overlaps_box(Vec2::new(110.0, 50.0), Vec2::splat(32.0)));
        assert!(map.overlaps_box(Vec2::new(90.0, 50.0), Vec2::splat(32.0)));
        assert!(!map.overlaps_box(Vec2::new(50.0, 50.0), Vec2::splat(32.0)));
        assert!(!map.overlaps_box(Vec2::new(110.0, 300.0), Vec2::splat(32.0)));
    }

    #[test]
    fn test_rect_overlap() {
        let map = wall();
        assert!(map.overlaps(Rect::new(0.0, 0.0, 105.0, 10.0)));
        assert!(!map.overlaps(Rect::new(0.0, 0.0, 50.0, 10.0)));
    }

    #[test]
    fn test_degenerate_obstacles_are_ignored() {
        let map = ObstacleMap::from_rects([Rect::new(0.0, 0.0, 0.0, 10.0)]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::centered(Vec2::new(10.0, 10.0), Vec2::new(4.0, 6.0));
        assert_eq!(rect.min(), Vec2::new(8.0, 7.0));
        assert_eq!(rect.max(), Vec2::new(12.0, 13.0));
        assert_eq!(rect.center(), Vec2::new(10.0, 10.0));
        assert!(rect.contains(Vec2::new(9.0, 12.0)));
        assert!(!rect.contains(Vec2::new(13.0, 12.0)));
    }
}
