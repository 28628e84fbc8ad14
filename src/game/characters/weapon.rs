// Weapons and weapon-aware clip selection
//
// Not every weapon has a bespoke clip for every state, so clip names are
// resolved through an ordered list of strategies and the first hit wins.

use super::state::EntityState;
use crate::engine::assets::ClipSet;
use serde::{Deserialize, Serialize};

/// Weapon the player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponType {
    Bat,
    #[default]
    Gun,
    Knife,
    Riffle,
    FlameThrower,
}

impl WeaponType {
    pub const ALL: [WeaponType; 5] = [
        WeaponType::Bat,
        WeaponType::Gun,
        WeaponType::Knife,
        WeaponType::Riffle,
        WeaponType::FlameThrower,
    ];

    /// Token used in clip names
    pub fn token(&self) -> &'static str {
        match self {
            Self::Bat => "Bat",
            Self::Gun => "Gun",
            Self::Knife => "Knife",
            Self::Riffle => "Riffle",
            Self::FlameThrower => "FlameThrower",
        }
    }

    /// Name of the weapon's own attack clip
    pub fn attack_clip(&self) -> &'static str {
        match self {
            Self::Gun => "Gun_Shot",
            other => other.token(),
        }
    }
}

/// One way of turning (state, weapon) into a clip name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// `{prefix}_{weapon}` ignoring case; without a weapon, the bare prefix
    Exact,
    /// The weapon's own attack clip, for Attacking only
    WeaponAction,
    /// A clip starting with the prefix whose name mentions the weapon
    Partial,
    /// Any clip starting with the prefix
    Generic,
}

/// Strategies in the order they are tried for each of a state's prefixes
///
/// The state's own prefix is exhausted before the next one is considered,
/// so an Idle clip of any kind beats the Walk pose that stands in for it.
pub const RESOLVE_ORDER: [ResolveStrategy; 4] = [
    ResolveStrategy::Exact,
    ResolveStrategy::WeaponAction,
    ResolveStrategy::Partial,
    ResolveStrategy::Generic,
];

impl ResolveStrategy {
    /// Try this strategy alone against one clip name prefix
    pub fn apply(
        &self,
        clips: &ClipSet,
        prefix: &str,
        state: EntityState,
        weapon: Option<WeaponType>,
    ) -> Option<String> {
        match (self, weapon) {
            (Self::Exact, Some(weapon)) => {
                let wanted = format!("{}_{}", prefix, weapon.token());
                find_clip(clips, |name| name.eq_ignore_ascii_case(&wanted))
            }
            (Self::Exact, None) => find_clip(clips, |name| name == prefix),

            (Self::WeaponAction, Some(weapon)) if state == EntityState::Attacking => {
                find_clip(clips, |name| name == weapon.attack_clip())
            }
            (Self::WeaponAction, _) => None,

            (Self::Partial, Some(weapon)) => {
                let token = weapon.token().to_ascii_lowercase();
                find_clip(clips, |name| {
                    name.starts_with(prefix) && name.to_ascii_lowercase().contains(&token)
                })
            }
            (Self::Partial, None) => None,

            (Self::Generic, _) => find_clip(clips, |name| name.starts_with(prefix)),
        }
    }
}

fn find_clip<F: Fn(&str) -> bool>(clips: &ClipSet, matches: F) -> Option<String> {
    clips.names().find(|name| matches(name)).map(str::to_string)
}

/// Clip to show for `state`: every strategy on the first prefix, then the next
pub fn resolve_clip(clips: &ClipSet, state: EntityState, weapon: Option<WeaponType>) -> Option<String> {
    state.clip_prefixes().iter().find_map(|prefix| {
        RESOLVE_ORDER
            .iter()
            .find_map(|strategy| strategy.apply(clips, prefix, state, weapon))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AnimationClip;

    fn player_clips() -> ClipSet {
        ClipSet::new()
            .with_clip(AnimationClip::movement("Walk_gun", 3))
            .with_clip(AnimationClip::movement("Walk_Knife_alt", 3))
            .with_clip(AnimationClip::movement("Walk_riffle", 3))
            .with_clip(AnimationClip::action("Gun_Shot", 2))
            .with_clip(AnimationClip::action("Bat", 4))
            .with_clip(AnimationClip::action("Death", 6))
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let clips = player_clips();
        let name = resolve_clip(&clips, EntityState::Walking, Some(WeaponType::Gun));
        assert_eq!(name.as_deref(), Some("Walk_gun"));
    }

    #[test]
    fn test_partial_match_on_weapon_token() {
        let clips = player_clips();
        let name = resolve_clip(&clips, EntityState::Walking, Some(WeaponType::Knife));
        assert_eq!(name.as_deref(), Some("Walk_Knife_alt"));
    }

    #[test]
    fn test_generic_fallback() {
        let clips = player_clips();
        // No flamethrower walk clip at all; first Walk clip by name
        let name = resolve_clip(&clips, EntityState::Walking, Some(WeaponType::FlameThrower));
        assert_eq!(name.as_deref(), Some("Walk_Knife_alt"));
    }

    #[test]
    fn test_idle_falls_back_to_walk() {
        let clips = player_clips();
        let name = resolve_clip(&clips, EntityState::Idle, Some(WeaponType::Riffle));
        assert_eq!(name.as_deref(), Some("Walk_riffle"));
    }

    #[test]
    fn test_attack_uses_weapon_clip() {
        let clips = player_clips();
        assert_eq!(
            resolve_clip(&clips, EntityState::Attacking, Some(WeaponType::Gun)).as_deref(),
            Some("Gun_Shot")
        );
        assert_eq!(
            resolve_clip(&clips, EntityState::Attacking, Some(WeaponType::Bat)).as_deref(),
            Some("Bat")
        );
        assert_eq!(resolve_clip(&clips, EntityState::Attacking, Some(WeaponType::Knife)), None);
    }

    #[test]
    fn test_enemy_resolution_without_weapon() {
        let clips = ClipSet::new()
            .with_clip(AnimationClip::movement("Walk", 4))
            .with_clip(AnimationClip::action("Attack", 3))
            .with_clip(AnimationClip::action("Death_2", 5));

        assert_eq!(resolve_clip(&clips, EntityState::Idle, None).as_deref(), Some("Walk"));
        assert_eq!(resolve_clip(&clips, EntityState::Attacking, None).as_deref(), Some("Attack"));
        assert_eq!(resolve_clip(&clips, EntityState::Dying, None).as_deref(), Some("Death_2"));
    }

    #[test]
    fn test_strategies_in_isolation() {
        let clips = player_clips();
        let weapon = Some(WeaponType::Knife);
        let walking = EntityState::Walking;
        assert_eq!(ResolveStrategy::Exact.apply(&clips, "Walk", walking, weapon), None);
        assert_eq!(
            ResolveStrategy::Partial.apply(&clips, "Walk", walking, weapon).as_deref(),
            Some("Walk_Knife_alt")
        );
        assert_eq!(ResolveStrategy::WeaponAction.apply(&clips, "Walk", walking, weapon), None);
    }

    #[test]
    fn test_own_prefix_beats_stand_in_prefix() {
        let clips = player_clips().with_clip(AnimationClip::movement("Idle_Gun_hold", 2));

        // A partial Idle match wins over the exact Walk_gun stand-in
        let name = resolve_clip(&clips, EntityState::Idle, Some(WeaponType::Gun));
        assert_eq!(name.as_deref(), Some("Idle_Gun_hold"));

        // Even a generic Idle clip is preferred to any Walk pose
        let name = resolve_clip(&clips, EntityState::Idle, Some(WeaponType::Riffle));
        assert_eq!(name.as_deref(), Some("Idle_Gun_hold"));
    }
}
