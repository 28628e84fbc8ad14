// Player character: input-driven body with a weapon

use super::character::{Animatable, CharacterBody, Damageable, HasBody, Steerable};
use super::stats::CharacterStats;
use super::weapon::WeaponType;
use crate::config::GameSettings;
use crate::engine::assets::PresetHandle;
use crate::game::events::{EntityId, EventQueue};
use glam::Vec2;

/// Input for one tick, filled in by the host
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Desired movement direction; zero lets the player glide to a stop
    pub direction: Vec2,
    /// World position the player looks at (the mouse cursor)
    pub aim: Option<Vec2>,
    pub attack: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    body: CharacterBody,
}

impl Player {
    /// The player is always entity 0
    pub const ID: EntityId = 0;

    pub fn new(
        stats: CharacterStats,
        preset: PresetHandle,
        settings: &GameSettings,
        position: Vec2,
        events: EventQueue,
    ) -> Self {
        let body = CharacterBody::new(Self::ID, stats, preset, settings, position, events)
            .with_weapon(WeaponType::default());
        Self { body }
    }

    pub fn weapon(&self) -> WeaponType {
        self.body.weapon().unwrap_or_default()
    }

    pub fn set_weapon(&mut self, weapon: WeaponType) {
        log::info!("Player switched to {:?}", weapon);
        self.body.set_weapon(weapon);
    }

    pub fn attack(&mut self) -> bool {
        self.body.trigger_attack()
    }

    pub fn die(&mut self) -> bool {
        self.body.trigger_die()
    }

    /// Apply this tick's input
    pub fn control(&mut self, input: &PlayerInput, dt: f32) {
        if self.is_dead() {
            self.stop(dt);
            return;
        }

        self.steer(input.direction, dt);
        if let Some(aim) = input.aim {
            self.look_at(aim);
        }
        if input.attack {
            self.attack();
        }
    }

    pub fn finish_tick(&mut self, dt: f32) {
        let before = self.state();
        self.body.finish_tick(dt);
        if self.state() != before {
            log::info!("Player {:?} -> {:?}", before, self.state());
        }
    }

    /// Put the player back at full health, alive and at rest
    pub fn respawn(&mut self, position: Vec2) {
        self.body.reset(position);
    }
}

impl HasBody for Player {
    fn body(&self) -> &CharacterBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut CharacterBody {
        &mut self.body
    }
}

impl Animatable for Player {}
impl Steerable for Player {}
impl Damageable for Player {}
