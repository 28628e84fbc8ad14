// Character stats - one fixed block per character kind
// Players and zombies share the same shape, tuned differently

use serde::{Deserialize, Serialize};

/// Tunable per-character properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterStats {
    // Movement
    /// Speed the character is pushed at when moving (units/second)
    pub speed: f32,
    /// Hard cap on velocity magnitude after friction
    pub max_speed: f32,
    /// Friction coefficient in [0, 1]; 1.0 stops the body instantly
    pub friction: f32,

    // Combat
    /// Base health points
    pub max_health: f32,
    /// Damage dealt each time an attack is triggered
    pub damage: f32,

    // Enemy AI ranges (ignored for the player)
    /// Distance at which an attack is triggered
    pub attack_range: f32,
    /// Distance at which the player is pursued
    pub detection_range: f32,
    /// Distance beyond which the enemy stays idle
    pub physics_range: f32,

    // Dimensions
    /// Body width in world units
    pub width: f32,
    /// Body height in world units
    pub height: f32,
}

/// Player character tuning
pub const PLAYER_STATS: CharacterStats = CharacterStats {
    speed: 500.0,
    max_speed: 500.0,
    friction: 0.9999,

    max_health: 100.0,
    damage: 10.0,

    attack_range: 0.0,
    detection_range: 0.0,
    physics_range: 0.0,

    width: 32.0,
    height: 32.0,
};

/// Zombie tuning - 40% of the player's speed
pub const ZOMBIE_STATS: CharacterStats = CharacterStats {
    speed: 200.0,
    max_speed: 200.0,
    friction: 0.9999,

    max_health: 100.0,
    damage: 10.0,

    attack_range: 50.0,
    detection_range: 300.0,
    physics_range: 1500.0,

    width: 32.0,
    height: 32.0,
};

impl Default for CharacterStats {
    fn default() -> Self {
        ZOMBIE_STATS
    }
}

impl CharacterStats {
    /// Stats used for the player character
    pub fn player() -> Self {
        PLAYER_STATS
    }

    /// Stats used for zombies
    pub fn zombie() -> Self {
        ZOMBIE_STATS
    }

    /// Builder-style override of the AI ranges
    pub fn with_ranges(mut self, attack: f32, detection: f32, physics: f32) -> Self {
        self.attack_range = attack;
        self.detection_range = detection;
        self.physics_range = physics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_stats() {
        let stats = CharacterStats::player();
        assert_eq!(stats.speed, 500.0);
        assert_eq!(stats.max_health, 100.0);
    }

    #[test]
    fn test_zombie_is_slower_than_player() {
        assert!(ZOMBIE_STATS.speed < PLAYER_STATS.speed);
        assert_eq!(ZOMBIE_STATS.speed, PLAYER_STATS.speed * 0.4);
    }

    #[test]
    fn test_zombie_ranges_are_ordered() {
        let stats = CharacterStats::zombie();
        assert!(stats.attack_range < stats.detection_range);
        assert!(stats.detection_range < stats.physics_range);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let stats: CharacterStats = serde_json::from_str(r#"{ "damage": 25.0 }"#).unwrap();
        assert_eq!(stats.damage, 25.0);
        assert_eq!(stats.speed, ZOMBIE_STATS.speed);
    }
}
