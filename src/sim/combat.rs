//! Combat resolution: projectiles, melee slashes and damage application
//!
//! Resolution functions are generic over [`Damageable`] so the same code
//! handles player bullets against enemies and enemy bullets against the
//! player. They only *report* hits; the caller turns them into XP, score,
//! drops and feedback requests.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::Rgb;
use super::grid::TileGrid;
use super::rect::Rect;
use crate::consts::{
    BULLET_EDGE_SLACK, BULLET_MIN_X, BULLET_MIN_Y, FALL_DEATH_Y, SLASH_HEIGHT, SLASH_LIFETIME,
    SLASH_REACH, SLASH_WIDTH,
};

/// Anything with an identity and a hit box
pub trait Collidable {
    fn entity_id(&self) -> u32;
    fn hitbox(&self) -> Rect;
}

/// Anything that can take damage
pub trait Damageable: Collidable {
    fn is_alive(&self) -> bool;
    /// Apply `amount` damage and report what happened
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome;
}

/// Result of one damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was invulnerable or already dead
    Ignored,
    Hurt,
    /// Target died; `xp` is its full reward regardless of overkill
    Killed { xp: u32 },
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

/// Outcome of moving a bullet for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BulletFate {
    Flying,
    OutOfBounds,
    /// Struck a tile at this point
    HitTile(Vec2),
}

/// A projectile
#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
    pub owner: Faction,
    pub color: Rgb,
    pub alive: bool,
}

impl Bullet {
    /// Bullet travelling from `origin` toward `target` at `speed`.
    ///
    /// A zero-length aim fires along +x so no bullet is ever stationary.
    pub fn aimed(
        origin: Vec2,
        target: Vec2,
        speed: f32,
        damage: i32,
        owner: Faction,
        color: Rgb,
    ) -> Self {
        Self {
            pos: origin,
            vel: (target - origin).try_normalize().unwrap_or(Vec2::X) * speed,
            damage,
            owner,
            color,
            alive: true,
        }
    }

    /// Move one tick and test the landing point against nearby tiles
    pub fn advance(&mut self, grid: &TileGrid, tiles: &[Rect], world_width: f32) -> BulletFate {
        self.pos += self.vel;
        let in_bounds = self.pos.x > BULLET_MIN_X
            && self.pos.x < world_width + BULLET_EDGE_SLACK
            && self.pos.y > BULLET_MIN_Y
            && self.pos.y < FALL_DEATH_Y;
        if !in_bounds {
            self.alive = false;
            return BulletFate::OutOfBounds;
        }
        if grid.tile_at(tiles, self.pos).is_some() {
            self.alive = false;
            return BulletFate::HitTile(self.pos);
        }
        BulletFate::Flying
    }
}

/// A melee swing
#[derive(Debug, Clone, Serialize)]
pub struct Slash {
    /// Attacker centre at the moment of the swing
    pub origin: Vec2,
    pub facing: f32,
    pub damage: i32,
    pub life: u32,
    #[serde(skip)]
    hit: HashSet<u32>,
}

impl Slash {
    pub fn new(origin: Vec2, facing: f32, damage: i32) -> Self {
        Self {
            origin,
            facing,
            damage,
            life: SLASH_LIFETIME,
            hit: HashSet::new(),
        }
    }

    pub fn hitbox(&self) -> Rect {
        let center = Vec2::new(self.origin.x + self.facing * SLASH_REACH, self.origin.y);
        Rect::from_center(center, SLASH_WIDTH, SLASH_HEIGHT)
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Age by one tick
    pub fn tick(&mut self) {
        self.life = self.life.saturating_sub(1);
    }

    /// Fraction of lifetime remaining, for drawing
    pub fn progress(&self) -> f32 {
        self.life as f32 / SLASH_LIFETIME as f32
    }

    pub fn has_hit(&self, id: u32) -> bool {
        self.hit.contains(&id)
    }
}

/// One landed hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub target: u32,
    pub damage: i32,
    pub outcome: DamageOutcome,
    /// Target centre at the time of the hit
    pub at: Vec2,
}

/// Test every live bullet fired by `attacker` against `targets`.
///
/// The first live target containing the bullet point absorbs it, even when
/// the damage itself is ignored (invulnerability).
pub fn resolve_bullets<T: Damageable>(
    bullets: &mut [Bullet],
    attacker: Faction,
    targets: &mut [T],
) -> Vec<Hit> {
    let mut hits = Vec::new();
    for bullet in bullets
        .iter_mut()
        .filter(|b| b.alive && b.owner == attacker)
    {
        let Some(target) = targets
            .iter_mut()
            .find(|t| t.is_alive() && t.hitbox().contains_point(bullet.pos))
        else {
            continue;
        };
        let at = target.hitbox().center();
        let outcome = target.apply_damage(bullet.damage);
        bullet.alive = false;
        hits.push(Hit {
            target: target.entity_id(),
            damage: bullet.damage,
            outcome,
            at,
        });
    }
    hits
}

/// Apply every live slash to every live target it overlaps and has not
/// already struck during this swing.
pub fn resolve_slashes<T: Damageable>(slashes: &mut [Slash], targets: &mut [T]) -> Vec<Hit> {
    let mut hits = Vec::new();
    for slash in slashes.iter_mut().filter(|s| s.is_alive()) {
        let area = slash.hitbox();
        for target in targets.iter_mut() {
            let id = target.entity_id();
            if !target.is_alive() || slash.has_hit(id) || !area.intersects(&target.hitbox()) {
                continue;
            }
            let at = target.hitbox().center();
            let outcome = target.apply_damage(slash.damage);
            slash.hit.insert(id);
            hits.push(Hit {
                target: id,
                damage: slash.damage,
                outcome,
                at,
            });
        }
    }
    hits
}
