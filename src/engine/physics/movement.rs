// Movement integrator shared by the player and enemies
//
// Velocity decays exponentially with friction and is clamped to a max speed.
// Collision resolution is not done here; callers move bodies with `integrate`.

use crate::core::math::{clamp, clamp_length};
use glam::Vec2;

/// Position and velocity of a moving body
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    speed: f32,
    max_speed: f32,
    friction: f32,
}

impl Kinematics {
    /// Create a body at rest. `friction` is clamped to [0, 1].
    pub fn new(position: Vec2, speed: f32, max_speed: f32, friction: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            speed,
            max_speed,
            friction: clamp(friction, 0.0, 1.0),
        }
    }

    /// Push the body along `direction` for one tick.
    ///
    /// A non-zero direction replaces the velocity with `speed` along it. Friction
    /// is applied either way, so a zero direction glides to a stop over a few
    /// ticks instead of halting at once.
    pub fn steer(&mut self, direction: Vec2, dt: f32) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.velocity = direction * self.speed;
        }

        let friction_factor = (1.0 - self.friction).powf(dt);
        self.velocity *= friction_factor;
        self.velocity = clamp_length(self.velocity, self.max_speed);
    }

    /// Steer with a zero direction
    pub fn stop(&mut self, dt: f32) {
        self.steer(Vec2::ZERO, dt);
    }

    /// Advance the position by the current velocity
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Place the body somewhere else, at rest
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
    }

    /// Current velocity magnitude
    pub fn current_speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}
