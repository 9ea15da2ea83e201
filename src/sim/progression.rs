//! Experience, levels and ability unlocks
//!
//! Movement abilities unlock from player level thresholds. Keycards have no
//! level threshold and only unlock through an explicit grant.

use serde::{Deserialize, Serialize};

use crate::consts::{XP_BASE_THRESHOLD, XP_GROWTH};

/// Unlockable abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    DoubleJump,
    Dash,
    WallJump,
    Keycard1,
    Keycard2,
}

impl Ability {
    pub const ALL: [Ability; 5] = [
        Ability::DoubleJump,
        Ability::Dash,
        Ability::WallJump,
        Ability::Keycard1,
        Ability::Keycard2,
    ];

    /// Player level that unlocks this ability, `None` for item-gated ones
    pub fn unlock_level(self) -> Option<u32> {
        match self {
            Ability::DoubleJump => Some(2),
            Ability::Dash => Some(3),
            Ability::WallJump => Some(4),
            Ability::Keycard1 | Ability::Keycard2 => None,
        }
    }

    /// Name shown in the ability menu
    pub fn display_name(self) -> &'static str {
        match self {
            Ability::DoubleJump => "Double jump",
            Ability::Dash => "Dash",
            Ability::WallJump => "Wall jump",
            Ability::Keycard1 => "Keycard level 1",
            Ability::Keycard2 => "Keycard level 2",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Unlock state for every ability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet {
    unlocked: [bool; 5],
}

impl AbilitySet {
    pub fn has(&self, ability: Ability) -> bool {
        self.unlocked[ability.index()]
    }

    /// Unlock an ability; returns true if it was previously locked
    pub fn grant(&mut self, ability: Ability) -> bool {
        let slot = &mut self.unlocked[ability.index()];
        let newly = !*slot;
        *slot = true;
        newly
    }

    /// Unlock every level-gated ability whose threshold `level` meets.
    ///
    /// Idempotent; returns only the abilities unlocked by this call.
    pub fn check_unlocks(&mut self, level: u32) -> Vec<Ability> {
        Ability::ALL
            .into_iter()
            .filter(|a| a.unlock_level().is_some_and(|req| req > 0 && level >= req))
            .filter(|&a| self.grant(a))
            .collect()
    }

    /// (ability, unlocked) pairs in menu order
    pub fn iter(&self) -> impl Iterator<Item = (Ability, bool)> + '_ {
        Ability::ALL.into_iter().map(|a| (a, self.has(a)))
    }
}

/// Obstacle categories that may require an ability to pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Keycard1,
    Keycard2,
    DoubleJumpRequired,
    DashRequired,
    WallJumpRequired,
    /// Unrecognised tag; always passable
    Other(String),
}

impl ObstacleKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "keycard_1" => ObstacleKind::Keycard1,
            "keycard_2" => ObstacleKind::Keycard2,
            "double_jump_required" => ObstacleKind::DoubleJumpRequired,
            "dash_required" => ObstacleKind::DashRequired,
            "wall_jump_required" => ObstacleKind::WallJumpRequired,
            other => ObstacleKind::Other(other.to_string()),
        }
    }

    pub fn required_ability(&self) -> Option<Ability> {
        match self {
            ObstacleKind::Keycard1 => Some(Ability::Keycard1),
            ObstacleKind::Keycard2 => Some(Ability::Keycard2),
            ObstacleKind::DoubleJumpRequired => Some(Ability::DoubleJump),
            ObstacleKind::DashRequired => Some(Ability::Dash),
            ObstacleKind::WallJumpRequired => Some(Ability::WallJump),
            ObstacleKind::Other(_) => None,
        }
    }

    /// Unknown obstacles are passable
    pub fn passable_with(&self, abilities: &AbilitySet) -> bool {
        self.required_ability().is_none_or(|a| abilities.has(a))
    }
}

/// Passability query by raw obstacle tag
pub fn can_pass_obstacle(tag: &str, abilities: &AbilitySet) -> bool {
    ObstacleKind::from_tag(tag).passable_with(abilities)
}

/// Experience and level counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub xp: u32,
    pub level: u32,
    pub xp_to_next: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            xp_to_next: XP_BASE_THRESHOLD,
        }
    }
}

impl Progression {
    /// Add experience and roll over every threshold it crosses.
    ///
    /// Returns the number of levels gained.
    pub fn gain(&mut self, xp: u32) -> u32 {
        self.xp += xp;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = (self.xp_to_next as f32 * XP_GROWTH) as u32;
            gained += 1;
        }
        gained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_gated_unlocks() {
        let mut set = AbilitySet::default();
        assert!(set.check_unlocks(1).is_empty());
        assert_eq!(set.check_unlocks(2), vec![Ability::DoubleJump]);
        assert_eq!(set.check_unlocks(4), vec![Ability::Dash, Ability::WallJump]);
        assert!(!set.has(Ability::Keycard1));
        assert!(!set.has(Ability::Keycard2));
    }

    #[test]
    fn test_keycards_never_unlock_from_level() {
        let mut set = AbilitySet::default();
        set.check_unlocks(99);
        assert!(!set.has(Ability::Keycard1));
        assert!(set.grant(Ability::Keycard1));
        assert!(!set.grant(Ability::Keycard1));
        assert!(set.has(Ability::Keycard1));
    }

    #[test]
    fn test_obstacle_passability() {
        let mut set = AbilitySet::default();
        assert!(!can_pass_obstacle("keycard_1", &set));
        assert!(!can_pass_obstacle("dash_required", &set));
        assert!(can_pass_obstacle("mystery_door", &set));
        set.check_unlocks(3);
        assert!(can_pass_obstacle("dash_required", &set));
        assert!(can_pass_obstacle("double_jump_required", &set));
        assert!(!can_pass_obstacle("wall_jump_required", &set));
    }

    #[test]
    fn test_gain_single_level() {
        // 90/100 + 30 -> one level, 20 left over, next threshold 160
        let mut p = Progression {
            xp: 90,
            level: 1,
            xp_to_next: 100,
        };
        assert_eq!(p.gain(30), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 20);
        assert_eq!(p.xp_to_next, 160);
    }

    #[test]
    fn test_gain_multiple_levels() {
        let mut p = Progression::default();
        // 100 + 160 = 260 reaches level 3 exactly
        assert_eq!(p.gain(260), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 0);
        assert_eq!(p.xp_to_next, 256);
    }

    proptest! {
        #[test]
        fn prop_unlock_is_idempotent(level in 0u32..10) {
            let mut once = AbilitySet::default();
            once.check_unlocks(level);
            let mut twice = once;
            let second = twice.check_unlocks(level);
            prop_assert!(second.is_empty());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_leveling_round_trip(threshold in 10u32..5000, extra_frac in 0.0f64..1.0) {
            let next = (threshold as f32 * XP_GROWTH) as u32;
            let k = ((next as f64) * extra_frac) as u32;
            prop_assume!(k < next);
            let mut p = Progression { xp: 0, level: 1, xp_to_next: threshold };
            prop_assert_eq!(p.gain(threshold + k), 1);
            prop_assert_eq!(p.xp, k);
            prop_assert_eq!(p.level, 2);
        }
    }
}
