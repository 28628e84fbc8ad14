// Zombie: the enemy AI controller
//
// Every tick the zombie checks, in priority order, whether it can attack,
// should chase the player, should wander, or should rest. Path searches go
// through a per-zombie throttled Navigator.

use super::character::{Animatable, CharacterBody, Damageable, HasBody, Steerable};
use super::stats::CharacterStats;
use crate::config::GameSettings;
use crate::core::math::symmetric_jitter;
use crate::engine::assets::PresetHandle;
use crate::engine::navigation::{NavStep, Navigator, PathPlanner};
use crate::game::events::{EntityId, EventQueue, GameEvent};
use glam::Vec2;

/// What the controller decided this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// In attack range; `triggered` when a new attack started this tick
    Attack { triggered: bool },
    /// Following a path to the player
    Pursue,
    /// Following a path to the wander target
    Wander,
    /// Too far from the player to bother
    Rest,
    /// An action clip is playing; only braking
    Busy,
    /// Dead
    Inert,
}

#[derive(Debug, Clone)]
pub struct Zombie {
    body: CharacterBody,
    navigator: Navigator,
    wander_target: Option<Vec2>,
    wander_timer: f32,
    wander_interval: f32,
    wander_radius: f32,
}

impl Zombie {
    pub fn new(
        id: EntityId,
        stats: CharacterStats,
        preset: PresetHandle,
        settings: &GameSettings,
        position: Vec2,
        events: EventQueue,
    ) -> Self {
        Self {
            body: CharacterBody::new(id, stats, preset, settings, position, events),
            navigator: Navigator::new(settings.pathfind_delay),
            wander_target: None,
            wander_timer: 0.0,
            wander_interval: settings.wander_interval,
            wander_radius: settings.wander_radius,
        }
    }

    pub fn id(&self) -> EntityId {
        self.body.id()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn wander_target(&self) -> Option<Vec2> {
        self.wander_target
    }

    /// Damage dealt by one attack trigger
    pub fn damage(&self) -> f32 {
        self.body.stats.damage
    }

    /// Run the controller for one tick
    pub fn think(
        &mut self,
        dt: f32,
        player_position: Vec2,
        planner: &dyn PathPlanner,
        rng: &mut fastrand::Rng,
    ) -> Decision {
        if self.is_dead() {
            self.stop(dt);
            return Decision::Inert;
        }

        // Never re-path over an attack in progress
        if self.is_animation_locked() {
            self.stop(dt);
            return Decision::Busy;
        }

        let stats = self.body.stats;
        let distance = self.position().distance(player_position);

        if distance <= stats.attack_range {
            self.stop(dt);
            self.look_at(player_position);
            let triggered = self.body.trigger_attack();
            Decision::Attack { triggered }
        } else if distance <= stats.detection_range {
            self.goto(player_position, dt, planner);
            self.look_at(player_position);
            Decision::Pursue
        } else if distance <= stats.physics_range {
            let target = self.refresh_wander_target(dt, rng);
            self.goto(target, dt, planner);
            Decision::Wander
        } else {
            self.stop(dt);
            Decision::Rest
        }
    }

    fn refresh_wander_target(&mut self, dt: f32, rng: &mut fastrand::Rng) -> Vec2 {
        self.wander_timer += dt;

        match self.wander_target {
            Some(target) if self.wander_timer < self.wander_interval => target,
            _ => {
                self.wander_timer = 0.0;
                let offset = Vec2::new(
                    symmetric_jitter(rng, self.wander_radius),
                    symmetric_jitter(rng, self.wander_radius),
                );
                let target = self.position() + offset;
                self.wander_target = Some(target);
                target
            }
        }
    }

    fn goto(&mut self, target: Vec2, dt: f32, planner: &dyn PathPlanner) {
        let tick = self.navigator.goto(self.position(), target, dt, planner);

        if let Some(outcome) = tick.searched {
            self.body.emit(GameEvent::PathSearched {
                entity: self.id(),
                outcome,
            });
        }

        match tick.step {
            NavStep::Steer(direction) => self.steer(direction, dt),
            // Reached a waypoint: no new command this tick
            NavStep::Arrived => {}
            NavStep::Idle => self.stop(dt),
        }
    }

    pub fn finish_tick(&mut self, dt: f32) {
        self.body.finish_tick(dt);
    }

    /// Place the zombie somewhere new with a fresh body and no path
    pub fn respawn(&mut self, position: Vec2) {
        self.body.reset(position);
        self.navigator.reset();
        self.wander_target = None;
        self.wander_timer = 0.0;
    }
}

impl HasBody for Zombie {
    fn body(&self) -> &CharacterBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut CharacterBody {
        &mut self.body
    }
}

impl Animatable for Zombie {}
impl Steerable for Zombie {}
impl Damageable for Zombie {}
