// Character system
//
// - Shared body: kinematics, health, facing
// - State machine and animator driving the displayed clip
// - Weapon-aware clip resolution
// - Player (input driven) and Zombie (AI driven)

pub mod animation;
pub mod character;
pub mod player;
pub mod state;
pub mod stats;
pub mod weapon;
pub mod zombie;

// Re-export commonly used types
pub use animation::Animator;
pub use character::{Animatable, CharacterBody, Damageable, HasBody, Steerable};
pub use player::{Player, PlayerInput};
pub use state::{EntityState, StateMachine, Transition};
pub use stats::{CharacterStats, PLAYER_STATS, ZOMBIE_STATS};
pub use weapon::{resolve_clip, ResolveStrategy, WeaponType, RESOLVE_ORDER};
pub use zombie::{Decision, Zombie};
