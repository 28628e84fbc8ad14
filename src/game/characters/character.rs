// Shared character body and the capability traits built on it
//
// Player and Zombie each own one CharacterBody: animator, state machine,
// kinematics, facing and health. The traits below expose slices of it so
// systems only ask for the capability they use.

use super::animation::Animator;
use super::state::{EntityState, StateMachine, Transition};
use super::stats::CharacterStats;
use super::weapon::{resolve_clip, WeaponType};
use crate::config::GameSettings;
use crate::core::math::facing_degrees;
use crate::engine::assets::{FrameRef, PresetHandle};
use crate::engine::physics::Kinematics;
use crate::game::events::{EntityId, EventQueue, GameEvent};
use glam::Vec2;

/// State, animation, motion and health of one character
#[derive(Debug, Clone)]
pub struct CharacterBody {
    id: EntityId,
    pub stats: CharacterStats,
    pub kinematics: Kinematics,
    animator: Animator,
    state_machine: StateMachine,
    /// Facing angle in degrees, 0 along +y
    facing: f32,
    health: f32,
    /// Equipped weapon; enemies carry none
    weapon: Option<WeaponType>,
    /// Last clip resolution failure reported, to keep logs quiet
    unresolved: Option<(EntityState, Option<WeaponType>)>,
    events: EventQueue,
}

impl CharacterBody {
    pub fn new(
        id: EntityId,
        stats: CharacterStats,
        preset: PresetHandle,
        settings: &GameSettings,
        position: Vec2,
        events: EventQueue,
    ) -> Self {
        let mut body = Self {
            id,
            stats,
            kinematics: Kinematics::new(position, stats.speed, stats.max_speed, stats.friction),
            animator: Animator::new(preset, settings.frame_duration()),
            state_machine: StateMachine::new(settings.dead_zone),
            facing: 0.0,
            health: stats.max_health,
            weapon: None,
            unresolved: None,
            events,
        };
        body.refresh_animation();
        body
    }

    pub fn with_weapon(mut self, weapon: WeaponType) -> Self {
        self.weapon = Some(weapon);
        self.refresh_animation();
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> EntityState {
        self.state_machine.state()
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn position(&self) -> Vec2 {
        self.kinematics.position
    }

    pub fn weapon(&self) -> Option<WeaponType> {
        self.weapon
    }

    /// Change weapon and re-pick the clip for the current state
    pub fn set_weapon(&mut self, weapon: WeaponType) {
        if self.weapon != Some(weapon) {
            self.weapon = Some(weapon);
            self.refresh_animation();
        }
    }

    /// Select the clip for the current state; a no-op when it is already shown
    pub fn refresh_animation(&mut self) {
        self.select_clip(false);
    }

    fn select_clip(&mut self, restart: bool) {
        let Some(clips) = self.animator.preset().clips() else {
            return;
        };
        let state = self.state();

        match resolve_clip(&clips, state, self.weapon) {
            Some(name) if restart => {
                self.animator.restart_animation(&name);
            }
            Some(name) => {
                self.animator.set_animation(&name);
            }
            None => {
                let key = (state, self.weapon);
                if self.unresolved != Some(key) {
                    self.unresolved = Some(key);
                    log::warn!(
                        "Entity {} ({}): no clip for {:?} with {:?}",
                        self.id,
                        self.animator.preset().name(),
                        state,
                        self.weapon
                    );
                }
            }
        }
    }

    /// Entry actions and event for a state change
    fn enter(&mut self, transition: Transition) {
        // An attack always plays from its first frame
        self.select_clip(transition.to == EntityState::Attacking);

        self.events.push(GameEvent::StateChanged {
            entity: self.id,
            from: transition.from,
            to: transition.to,
        });
    }

    /// Attack trigger; true when the Attacking state was entered
    pub fn trigger_attack(&mut self) -> bool {
        match self.state_machine.trigger_attack() {
            Some(transition) => {
                self.enter(transition);
                true
            }
            None => false,
        }
    }

    /// Die trigger; true when the Dying state was entered
    pub fn trigger_die(&mut self) -> bool {
        match self.state_machine.trigger_die() {
            Some(transition) => {
                self.enter(transition);
                true
            }
            None => false,
        }
    }

    /// Second half of a tick, after the controller steered
    ///
    /// Integrates motion, lets the state machine follow the new speed, then
    /// advances the animator with the settled state.
    pub fn finish_tick(&mut self, dt: f32) {
        self.kinematics.integrate(dt);

        let speed = self.kinematics.current_speed();
        let action_finished = !self.animator.is_locked();
        if let Some(transition) = self.state_machine.update(dt, speed, action_finished) {
            self.enter(transition);
        }

        // Picks up clips whose config finished loading after the last change
        self.refresh_animation();
        self.animator.advance(dt, self.state());
    }

    /// Back to a fresh, idle body at `position`, keeping preset and weapon
    pub fn reset(&mut self, position: Vec2) {
        self.kinematics.teleport(position);
        self.animator = Animator::new(
            self.animator.preset().clone(),
            self.animator.frame_duration(),
        );
        self.state_machine = StateMachine::new(self.state_machine.dead_zone());
        self.health = self.stats.max_health;
        self.facing = 0.0;
        self.unresolved = None;
        self.refresh_animation();
    }

    pub(crate) fn emit(&self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn facing(&self) -> f32 {
        self.facing
    }

    pub fn look_at(&mut self, target: Vec2) {
        self.facing = facing_degrees(self.position(), target);
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.stats.max_health
    }

    /// Remove health, dying at zero. Returns the remaining health.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.state().is_terminal() {
            return self.health;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.health <= 0.0 {
            self.trigger_die();
        }
        self.health
    }
}

/// Anything built around a CharacterBody
pub trait HasBody {
    fn body(&self) -> &CharacterBody;
    fn body_mut(&mut self) -> &mut CharacterBody;
}

/// Characters whose displayed frame follows their state
pub trait Animatable: HasBody {
    fn state(&self) -> EntityState {
        self.body().state()
    }

    fn frame_data(&self) -> Option<FrameRef> {
        self.body().animator().frame_data()
    }

    fn is_animation_locked(&self) -> bool {
        self.body().animator().is_locked()
    }
}

/// Characters that can be moved around
pub trait Steerable: HasBody {
    fn position(&self) -> Vec2 {
        self.body().position()
    }

    fn velocity(&self) -> Vec2 {
        self.body().kinematics.velocity
    }

    /// Push along `direction`; a zero direction lets the body glide to a stop
    fn steer(&mut self, direction: Vec2, dt: f32) {
        self.body_mut().kinematics.steer(direction, dt);
    }

    fn stop(&mut self, dt: f32) {
        self.body_mut().kinematics.stop(dt);
    }

    fn look_at(&mut self, target: Vec2) {
        self.body_mut().look_at(target);
    }

    fn facing(&self) -> f32 {
        self.body().facing()
    }
}

/// Characters with health
pub trait Damageable: HasBody {
    fn health(&self) -> f32 {
        self.body().health()
    }

    /// Health as a fraction of the maximum, for health bars
    fn health_fraction(&self) -> f32 {
        let max = self.body().max_health();
        if max > 0.0 {
            self.body().health() / max
        } else {
            0.0
        }
    }

    fn take_damage(&mut self, amount: f32) -> f32 {
        self.body_mut().take_damage(amount)
    }

    fn is_dead(&self) -> bool {
        self.body().state().is_terminal()
    }
}

impl HasBody for CharacterBody {
    fn body(&self) -> &CharacterBody {
        self
    }

    fn body_mut(&mut self) -> &mut CharacterBody {
        self
    }
}

impl Animatable for CharacterBody {}
impl Steerable for CharacterBody {}
impl Damageable for CharacterBody {}
