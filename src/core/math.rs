// Math utilities and helper functions

use glam::Vec2;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Rescale `v` so its length never exceeds `max`, keeping its direction
pub fn clamp_length(v: Vec2, max: f32) -> Vec2 {
    let length = v.length();
    if length > max && length > 0.0 {
        v * (max / length)
    } else {
        v
    }
}

/// Facing angle in degrees for looking from `from` towards `to`.
///
/// Zero points along +Y and angles grow clockwise, which is how the
/// character sprites are authored (pointing down the Y axis).
pub fn facing_degrees(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.x.atan2(delta.y).to_degrees()
}

/// Uniform sample in `[-extent, extent]`
pub fn symmetric_jitter(rng: &mut fastrand::Rng, extent: f32) -> f32 {
    (rng.f32() * 2.0 - 1.0) * extent
}
