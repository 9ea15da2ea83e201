//! Pickups placed in levels or dropped by enemies

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::combat::Collidable;
use super::rect::Rect;
use crate::consts::{DROP_CHANCE, ITEM_BOB_AMPLITUDE, ITEM_BOB_RATE, PICKUP_SIZE};

/// What a pickup restores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Health,
    Ammo,
}

impl ItemKind {
    /// Parse a level-file item tag
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "health" => Some(ItemKind::Health),
            "ammo" => Some(ItemKind::Ammo),
            _ => None,
        }
    }
}

/// A pickup in the world
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: u32,
    /// Anchor point; the hit box bobs around it
    pub pos: Vec2,
    pub kind: ItemKind,
    pub alive: bool,
    pub bob: f32,
}

impl Item {
    pub fn new(id: u32, pos: Vec2, kind: ItemKind, bob: f32) -> Self {
        Self {
            id,
            pos,
            kind,
            alive: true,
            bob,
        }
    }

    /// Advance the bob animation
    pub fn tick(&mut self) {
        self.bob += ITEM_BOB_RATE;
    }

    /// Current drawn position including bob
    pub fn display_pos(&self) -> Vec2 {
        Vec2::new(self.pos.x, self.pos.y - self.bob.sin() * ITEM_BOB_AMPLITUDE)
    }
}

impl Collidable for Item {
    fn entity_id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Rect {
        Rect::from_center(self.display_pos(), PICKUP_SIZE, PICKUP_SIZE)
    }
}

/// Roll for an enemy drop: `DROP_CHANCE` of any item, then health or ammo
/// with equal odds.
pub fn roll_drop<R: Rng + ?Sized>(rng: &mut R) -> Option<ItemKind> {
    if !rng.random_bool(DROP_CHANCE) {
        return None;
    }
    Some(if rng.random_bool(0.5) {
        ItemKind::Health
    } else {
        ItemKind::Ammo
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hitbox_tracks_bob() {
        let mut item = Item::new(1, Vec2::new(100.0, 200.0), ItemKind::Health, 0.0);
        assert_eq!(item.hitbox(), Rect::new(88.0, 188.0, 24.0, 24.0));
        item.bob = std::f32::consts::FRAC_PI_2;
        assert!((item.hitbox().center().y - 195.0).abs() < 1e-4);
    }

    #[test]
    fn test_drop_rate_roughly_matches() {
        let mut rng = Pcg32::seed_from_u64(7);
        let drops = (0..10_000).filter_map(|_| roll_drop(&mut rng)).collect::<Vec<_>>();
        let rate = drops.len() as f64 / 10_000.0;
        assert!((rate - DROP_CHANCE).abs() < 0.03, "rate {rate}");
        assert!(drops.contains(&ItemKind::Health));
        assert!(drops.contains(&ItemKind::Ammo));
    }

    #[test]
    fn test_item_tags() {
        assert_eq!(ItemKind::from_key("health"), Some(ItemKind::Health));
        assert_eq!(ItemKind::from_key("ammo"), Some(ItemKind::Ammo));
        assert_eq!(ItemKind::from_key("shield"), None);
    }
}
