// Character state machine
//
// Idle and Walking follow the speed every tick. Attacking and Dying are only
// entered by triggers; Attacking ends when its action clip finishes and Dying
// never ends.

/// Behavioral state of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityState {
    /// Standing still
    #[default]
    Idle,
    /// Moving faster than the dead zone
    Walking,
    /// Playing an attack; locked until the clip finishes
    Attacking,
    /// Dead and inert, waiting for external removal
    Dying,
}

impl EntityState {
    /// Clip name prefixes tried for this state, in order
    pub fn clip_prefixes(&self) -> &'static [&'static str] {
        match self {
            // A walk clip pinned at frame 0 doubles as the idle pose
            Self::Idle => &["Idle", "Walk"],
            Self::Walking => &["Walk"],
            Self::Attacking => &["Attack"],
            Self::Dying => &["Death"],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dying)
    }

    /// Whether attack or die triggers are accepted from this state
    pub fn accepts_attack(&self) -> bool {
        matches!(self, Self::Idle | Self::Walking)
    }

    /// Whether the state follows the speed every tick
    pub fn is_locomotion(&self) -> bool {
        matches!(self, Self::Idle | Self::Walking)
    }
}

/// A state change reported by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EntityState,
    pub to: EntityState,
}

/// Per-character state machine
#[derive(Debug, Clone)]
pub struct StateMachine {
    current_state: EntityState,
    previous_state: EntityState,
    state_time: f32,
    dead_zone: f32,
}

impl StateMachine {
    pub fn new(dead_zone: f32) -> Self {
        Self {
            current_state: EntityState::Idle,
            previous_state: EntityState::Idle,
            state_time: 0.0,
            dead_zone: dead_zone.max(0.0),
        }
    }

    pub fn state(&self) -> EntityState {
        self.current_state
    }

    pub fn previous_state(&self) -> EntityState {
        self.previous_state
    }

    /// Time spent in the current state
    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    fn transition(&mut self, new_state: EntityState) -> Option<Transition> {
        if self.current_state == new_state {
            return None;
        }
        let from = self.current_state;
        self.previous_state = from;
        self.current_state = new_state;
        self.state_time = 0.0;
        Some(Transition { from, to: new_state })
    }

    /// Locomotion state for a given speed
    fn locomotion_for(&self, speed: f32) -> EntityState {
        if speed > self.dead_zone {
            EntityState::Walking
        } else {
            EntityState::Idle
        }
    }

    /// Per-tick update
    ///
    /// `action_finished` is true once the animator's overwrite lock has
    /// cleared; only then may Attacking hand back to Idle or Walking.
    pub fn update(&mut self, dt: f32, speed: f32, action_finished: bool) -> Option<Transition> {
        match self.current_state {
            EntityState::Dying => None,
            EntityState::Attacking => {
                self.state_time += dt;
                if action_finished {
                    self.transition(self.locomotion_for(speed))
                } else {
                    None
                }
            }
            EntityState::Idle | EntityState::Walking => {
                self.state_time += dt;
                self.transition(self.locomotion_for(speed))
            }
        }
    }

    /// Attack trigger; ignored unless Idle or Walking
    pub fn trigger_attack(&mut self) -> Option<Transition> {
        if self.current_state.accepts_attack() {
            self.transition(EntityState::Attacking)
        } else {
            None
        }
    }

    /// Die trigger; succeeds from every state except Dying
    pub fn trigger_die(&mut self) -> Option<Transition> {
        self.transition(EntityState::Dying)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sm = StateMachine::default();
        assert_eq!(sm.state(), EntityState::Idle);
        assert_eq!(sm.previous_state(), EntityState::Idle);
    }

    #[test]
    fn test_dead_zone_swaps_idle_and_walking() {
        let mut sm = StateMachine::new(0.1);

        assert_eq!(sm.update(0.1, 0.1, true), None, "at the dead zone counts as still");

        let change = sm.update(0.1, 0.2, true).unwrap();
        assert_eq!(change, Transition { from: EntityState::Idle, to: EntityState::Walking });

        let change = sm.update(0.1, 0.05, true).unwrap();
        assert_eq!(change.to, EntityState::Idle);
        assert_eq!(sm.previous_state(), EntityState::Walking);
    }

    #[test]
    fn test_attack_waits_for_animation() {
        let mut sm = StateMachine::new(0.1);
        assert!(sm.trigger_attack().is_some());

        // Speed alone never ends an attack
        assert_eq!(sm.update(0.1, 100.0, false), None);
        assert_eq!(sm.state(), EntityState::Attacking);

        let change = sm.update(0.1, 100.0, true).unwrap();
        assert_eq!(change.to, EntityState::Walking);
    }

    #[test]
    fn test_attack_reentry_is_ignored() {
        let mut sm = StateMachine::default();
        sm.trigger_attack();
        sm.update(0.3, 0.0, false);
        assert!(sm.trigger_attack().is_none());
        assert!((sm.state_time() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_die_is_terminal() {
        let mut sm = StateMachine::default();
        sm.trigger_attack();

        let change = sm.trigger_die().unwrap();
        assert_eq!(change.from, EntityState::Attacking);
        assert!(sm.state().is_terminal());

        assert!(sm.trigger_die().is_none());
        assert!(sm.trigger_attack().is_none());
        assert_eq!(sm.update(0.1, 300.0, true), None);
        assert_eq!(sm.state(), EntityState::Dying);
    }

    #[test]
    fn test_state_time_resets_on_transition() {
        let mut sm = StateMachine::default();
        sm.update(0.5, 0.0, true);
        assert!((sm.state_time() - 0.5).abs() < f32::EPSILON);
        sm.update(0.1, 10.0, true);
        assert_eq!(sm.state_time(), 0.0);
    }

    #[test]
    fn test_clip_prefixes() {
        assert_eq!(EntityState::Idle.clip_prefixes(), &["Idle", "Walk"]);
        assert_eq!(EntityState::Attacking.clip_prefixes(), &["Attack"]);
        assert_eq!(EntityState::Dying.clip_prefixes(), &["Death"]);
    }
}
