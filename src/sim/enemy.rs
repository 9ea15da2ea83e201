//! Enemy archetypes, stats and AI
//!
//! Ground archetypes run a small state machine: patrol until the player is
//! within aggro radius, approach until inside attack radius, then wind up a
//! single contact strike and cool down. Drones hover, steer horizontally and
//! shoot. The boss is a ground enemy that adds a projectile volley once its
//! health drops below half.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat::{Bullet, Collidable, DamageOutcome, Damageable, Faction};
use super::effects::Rgb;
use super::physics::{Body, Solids, floor_ahead, move_and_collide};
use super::rect::Rect;
use crate::consts::*;
use crate::{facing_sign, lerp};

/// Closed set of enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Ground melee
    #[serde(alias = "infectado")]
    Infected,
    /// Flying ranged
    Drone,
    /// Heavy ground melee
    #[serde(alias = "mutante")]
    Mutant,
    #[serde(alias = "jefe")]
    Boss,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Infected,
        Archetype::Drone,
        Archetype::Mutant,
        Archetype::Boss,
    ];

    /// Parse a data-file key (English tags and the legacy keys)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "infected" | "infectado" => Some(Archetype::Infected),
            "drone" => Some(Archetype::Drone),
            "mutant" | "mutante" => Some(Archetype::Mutant),
            "boss" | "jefe" => Some(Archetype::Boss),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Archetype::Infected => "infected",
            Archetype::Drone => "drone",
            Archetype::Mutant => "mutant",
            Archetype::Boss => "boss",
        }
    }

    pub fn is_flying(self) -> bool {
        self == Archetype::Drone
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Base stats for one archetype; `*_per_level` terms scale with `level - 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    pub width: f32,
    pub height: f32,
    pub base_hp: i32,
    pub hp_per_level: i32,
    pub base_speed: f32,
    pub speed_per_level: f32,
    pub base_xp: u32,
    pub xp_per_level: u32,
    pub color: Rgb,
    pub attack_radius: f32,
    pub base_damage: i32,
    pub damage_per_level: i32,
    /// Ticks between attacks
    pub attack_cooldown: u32,
}

impl ArchetypeStats {
    /// Compiled-in stats
    pub fn defaults_for(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Infected => Self {
                width: 26.0,
                height: 42.0,
                base_hp: 65,
                hp_per_level: 22,
                base_speed: 2.3,
                speed_per_level: 0.3,
                base_xp: 20,
                xp_per_level: 6,
                color: Rgb(175, 75, 75),
                attack_radius: 34.0,
                base_damage: 12,
                damage_per_level: 3,
                attack_cooldown: 62,
            },
            Archetype::Drone => Self {
                width: 30.0,
                height: 22.0,
                base_hp: 48,
                hp_per_level: 16,
                base_speed: 2.8,
                speed_per_level: 0.4,
                base_xp: 32,
                xp_per_level: 8,
                color: Rgb(90, 90, 245),
                attack_radius: 350.0,
                base_damage: 14,
                damage_per_level: 3,
                attack_cooldown: 88,
            },
            Archetype::Mutant => Self {
                width: 44.0,
                height: 64.0,
                base_hp: 185,
                hp_per_level: 55,
                base_speed: 1.05,
                speed_per_level: 0.15,
                base_xp: 62,
                xp_per_level: 16,
                color: Rgb(120, 60, 28),
                attack_radius: 54.0,
                base_damage: 28,
                damage_per_level: 6,
                attack_cooldown: 82,
            },
            Archetype::Boss => Self {
                width: 78.0,
                height: 96.0,
                base_hp: 650,
                hp_per_level: 120,
                base_speed: 1.6,
                speed_per_level: 0.0,
                base_xp: 350,
                xp_per_level: 0,
                color: Rgb(60, 0, 130),
                attack_radius: 78.0,
                base_damage: 38,
                damage_per_level: 6,
                attack_cooldown: 68,
            },
        }
    }

    /// Resolve stats for an enemy of the given level
    pub fn scaled(&self, level: u32) -> EnemyStats {
        let s = level.saturating_sub(1);
        EnemyStats {
            size: Vec2::new(self.width, self.height),
            hp: self.base_hp + self.hp_per_level * s as i32,
            speed: self.base_speed + self.speed_per_level * s as f32,
            xp: self.base_xp + self.xp_per_level * s,
            damage: self.base_damage + self.damage_per_level * s as i32,
            attack_radius: self.attack_radius,
            attack_cooldown: self.attack_cooldown,
            color: self.color,
        }
    }
}

/// Level-resolved stats for one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub size: Vec2,
    pub hp: i32,
    pub speed: f32,
    pub xp: u32,
    pub damage: i32,
    pub attack_radius: f32,
    pub attack_cooldown: u32,
    pub color: Rgb,
}

/// Archetype lookup table, compiled-in unless overridden by data
#[derive(Debug, Clone, PartialEq)]
pub struct StatsTable {
    stats: [ArchetypeStats; 4],
}

impl Default for StatsTable {
    fn default() -> Self {
        Self {
            stats: Archetype::ALL.map(ArchetypeStats::defaults_for),
        }
    }
}

impl StatsTable {
    pub fn get(&self, archetype: Archetype) -> &ArchetypeStats {
        &self.stats[archetype.index()]
    }

    pub fn set(&mut self, archetype: Archetype, stats: ArchetypeStats) {
        self.stats[archetype.index()] = stats;
    }
}

/// AI state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Behavior {
    Patrol,
    Approach,
    /// Strike lands when `remaining` reaches zero
    Windup { remaining: u32 },
    /// Struck (or cancelled); waiting for the attack timer
    Cooldown,
    HoverIdle,
    HoverAggro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BossPhase {
    One,
    Two,
}

/// World facts an enemy reads during its update
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext {
    /// Player centre
    pub target: Vec2,
    /// Neural discharge is active
    pub slow_active: bool,
    pub time_ticks: u64,
}

/// What an enemy did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyAction {
    /// Contact damage to apply to the player
    pub strike: Option<i32>,
    /// Boss just entered phase two
    pub enraged: bool,
    pub shots_fired: u32,
}

/// A live (or dead, awaiting sweep) enemy
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub archetype: Archetype,
    pub body: Body,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub xp: u32,
    pub damage: i32,
    pub attack_radius: f32,
    pub attack_cooldown: u32,
    pub color: Rgb,
    pub facing: f32,
    pub alive: bool,
    pub behavior: Behavior,
    pub boss_phase: BossPhase,
    pub slowed: bool,
    /// Ticks until the next melee or drone shot may start
    pub attack_timer: u32,
    /// Ticks until the next boss volley
    pub shoot_timer: u32,
    pub patrol_ticks: u32,
    pub hurt: u32,
    /// Drone bob offset (radians)
    pub bob_phase: f32,
}

impl Enemy {
    /// Spawn with its top-left corner at `pos`
    pub fn new(
        id: u32,
        archetype: Archetype,
        pos: Vec2,
        level: u32,
        table: &StatsTable,
        bob_phase: f32,
    ) -> Self {
        let stats = table.get(archetype).scaled(level);
        Self {
            id,
            archetype,
            body: Body::new(pos, stats.size),
            hp: stats.hp,
            max_hp: stats.hp,
            speed: stats.speed,
            xp: stats.xp,
            damage: stats.damage,
            attack_radius: stats.attack_radius,
            attack_cooldown: stats.attack_cooldown,
            color: stats.color,
            facing: 1.0,
            alive: true,
            behavior: if archetype.is_flying() {
                Behavior::HoverIdle
            } else {
                Behavior::Patrol
            },
            boss_phase: BossPhase::One,
            slowed: false,
            attack_timer: 0,
            shoot_timer: 0,
            patrol_ticks: 0,
            hurt: 0,
            bob_phase,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.archetype == Archetype::Boss
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn hp_ratio(&self) -> f32 {
        (self.hp.max(0) as f32 / self.max_hp.max(1) as f32).clamp(0.0, 1.0)
    }

    /// Windup completion in [0, 1] while winding up
    pub fn windup_progress(&self) -> Option<f32> {
        match self.behavior {
            Behavior::Windup { remaining } => {
                Some(1.0 - remaining as f32 / WINDUP_TICKS as f32)
            }
            _ => None,
        }
    }

    /// Run one AI + physics tick
    pub fn update(
        &mut self,
        ctx: &EnemyContext,
        solids: Solids<'_>,
        bullets: &mut Vec<Bullet>,
    ) -> EnemyAction {
        self.hurt = self.hurt.saturating_sub(1);
        self.attack_timer = self.attack_timer.saturating_sub(1);
        self.shoot_timer = self.shoot_timer.saturating_sub(1);

        let delta = ctx.target - self.center();
        let dist = delta.length();
        let aggro = dist < AGGRO_RADIUS;
        self.slowed = ctx.slow_active && aggro;
        let slow = if self.slowed { SLOW_FACTOR } else { 1.0 };

        if self.archetype.is_flying() {
            return self.update_flying(ctx, delta, dist, aggro, slow, bullets);
        }

        let mut action = EnemyAction::default();
        self.body.apply_gravity();

        if aggro {
            self.facing = facing_sign(delta.x);
            if delta.x.abs() > self.attack_radius {
                self.body.vel.x = self.facing * self.speed * slow;
                self.behavior = Behavior::Approach;
            } else {
                self.body.vel.x *= APPROACH_BRAKE;
                action.strike = self.advance_attack();
            }
            if self.boss_phase == BossPhase::Two && self.shoot_timer == 0 {
                self.fire_volley(ctx.target, bullets);
                action.shots_fired = 2;
            }
        } else {
            self.patrol();
        }

        self.stop_at_ledge(aggro, solids);

        let incoming = self.body.vel.x;
        let contacts = move_and_collide(&mut self.body, solids);
        if let Some(wall) = contacts.wall {
            self.body.vel.x = -incoming * BOUNCE_DAMPING;
            self.facing = -wall;
        }
        self.body.vel.x *= ENEMY_DRAG;

        if self.body.pos.y > FALL_DEATH_Y {
            // Lost to a pit: swept without a kill reward
            log::debug!("Enemy {} fell out of the world", self.id);
            self.alive = false;
            return action;
        }

        if self.is_boss()
            && self.boss_phase == BossPhase::One
            && (self.hp as f32) < self.max_hp as f32 * BOSS_PHASE_TWO_RATIO
        {
            self.boss_phase = BossPhase::Two;
            action.enraged = true;
            log::info!("Boss {} entered phase two", self.id);
        }

        action
    }

    fn patrol(&mut self) {
        self.behavior = Behavior::Patrol;
        self.patrol_ticks += 1;
        self.body.vel.x = self.facing * self.speed * PATROL_SPEED_FACTOR;
        if self.patrol_ticks > PATROL_TICKS {
            self.patrol_ticks = 0;
            self.facing = -self.facing;
        }
    }

    /// Step the windup state machine while the player is in striking range
    fn advance_attack(&mut self) -> Option<i32> {
        match self.behavior {
            Behavior::Windup { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.behavior = Behavior::Cooldown;
                    Some(self.damage)
                } else {
                    self.behavior = Behavior::Windup { remaining };
                    None
                }
            }
            _ if self.attack_timer == 0 => {
                self.attack_timer = self.attack_cooldown;
                self.behavior = Behavior::Windup {
                    remaining: WINDUP_TICKS,
                };
                None
            }
            _ => {
                self.behavior = Behavior::Cooldown;
                None
            }
        }
    }

    /// Patrollers turn around at a ledge; pursuers stop at it
    fn stop_at_ledge(&mut self, aggro: bool, solids: Solids<'_>) {
        if !self.body.on_ground || self.body.vel.x == 0.0 {
            return;
        }
        let dir = facing_sign(self.body.vel.x);
        if floor_ahead(&self.body, dir, solids) {
            return;
        }
        self.body.vel.x = 0.0;
        if !aggro {
            self.facing = -dir;
            self.patrol_ticks = 0;
        }
    }

    fn fire_volley(&mut self, target: Vec2, bullets: &mut Vec<Bullet>) {
        let origin = self.center();
        for aim in [target, target + Vec2::new(BOSS_VOLLEY_SPREAD, 0.0)] {
            bullets.push(Bullet::aimed(
                origin,
                aim,
                BOSS_VOLLEY_SPEED,
                BOSS_VOLLEY_DAMAGE,
                Faction::Enemy,
                Rgb::PURPLE,
            ));
        }
        self.shoot_timer = BOSS_VOLLEY_INTERVAL;
    }

    fn update_flying(
        &mut self,
        ctx: &EnemyContext,
        delta: Vec2,
        dist: f32,
        aggro: bool,
        slow: f32,
        bullets: &mut Vec<Bullet>,
    ) -> EnemyAction {
        let mut action = EnemyAction::default();
        let t = ctx.time_ticks as f32 * DRONE_BOB_RATE + self.bob_phase;
        self.body.pos.y += t.sin() * DRONE_BOB_AMPLITUDE;

        if aggro {
            let target_vx = if dist > 2.0 {
                delta.x / dist * self.speed * slow
            } else {
                0.0
            };
            self.body.vel.x = lerp(self.body.vel.x, target_vx, DRONE_STEER);
            self.facing = facing_sign(delta.x);
            self.behavior = Behavior::HoverAggro;
        } else {
            self.body.vel.x *= DRONE_IDLE_DRAG;
            self.behavior = Behavior::HoverIdle;
        }
        self.body.pos.x += self.body.vel.x;

        if dist < self.attack_radius && self.attack_timer == 0 {
            bullets.push(Bullet::aimed(
                self.center(),
                ctx.target,
                DRONE_BULLET_SPEED * slow,
                self.damage,
                Faction::Enemy,
                self.color,
            ));
            self.attack_timer = self.attack_cooldown;
            action.shots_fired = 1;
        }
        action
    }
}

impl Collidable for Enemy {
    fn entity_id(&self) -> u32 {
        self.id
    }

    fn hitbox(&self) -> Rect {
        self.body.rect()
    }
}

impl Damageable for Enemy {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.hp -= amount;
        self.hurt = ENEMY_HURT_TICKS;
        if self.hp <= 0 {
            self.alive = false;
            DamageOutcome::Killed { xp: self.xp }
        } else {
            DamageOutcome::Hurt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FAR: Vec2 = Vec2::new(9000.0, 0.0);

    fn floor() -> Vec<Rect> {
        vec![Rect::new(0.0, 600.0, 2000.0, 300.0)]
    }

    fn spawn(archetype: Archetype, x: f32) -> Enemy {
        let table = StatsTable::default();
        let h = table.get(archetype).height;
        Enemy::new(1, archetype, Vec2::new(x, 600.0 - h), 1, &table, 0.0)
    }

    fn ctx(target: Vec2) -> EnemyContext {
        EnemyContext {
            target,
            slow_active: false,
            time_ticks: 0,
        }
    }

    #[test]
    fn test_overkill_kills_with_full_xp() {
        let mut e = spawn(Archetype::Infected, 500.0);
        assert_eq!(e.max_hp, 65);
        assert_eq!(e.apply_damage(70), DamageOutcome::Killed { xp: 20 });
        assert!(!e.alive);
        assert_eq!(e.apply_damage(10), DamageOutcome::Ignored);
    }

    #[test]
    fn test_stats_scale_with_level() {
        let table = StatsTable::default();
        let s = table.get(Archetype::Mutant).scaled(3);
        assert_eq!(s.hp, 185 + 2 * 55);
        assert_eq!(s.xp, 62 + 2 * 16);
        assert_eq!(s.damage, 28 + 2 * 6);
        let boss = table.get(Archetype::Boss).scaled(3);
        assert_eq!(boss.xp, 350);
        assert_eq!(boss.speed, 1.6);
    }

    #[test]
    fn test_archetype_keys() {
        assert_eq!(Archetype::from_key("infectado"), Some(Archetype::Infected));
        assert_eq!(Archetype::from_key("jefe"), Some(Archetype::Boss));
        assert_eq!(Archetype::from_key("mutant"), Some(Archetype::Mutant));
        assert_eq!(Archetype::from_key("slime"), None);
    }

    #[test]
    fn test_windup_strikes_once_after_delay() {
        let tiles = floor();
        let mut e = spawn(Archetype::Infected, 500.0);
        let target = e.center() + Vec2::new(17.0, 0.0);
        let mut bullets = Vec::new();

        let first = e.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(first.strike, None);
        assert!(matches!(e.behavior, Behavior::Windup { .. }));

        for _ in 0..WINDUP_TICKS - 1 {
            let a = e.update(&ctx(target), Solids::new(&tiles), &mut bullets);
            assert_eq!(a.strike, None);
        }
        let strike = e.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(strike.strike, Some(12));
        assert_eq!(e.behavior, Behavior::Cooldown);

        let after = e.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(after.strike, None);
    }

    #[test]
    fn test_leaving_range_cancels_windup() {
        let tiles = floor();
        let mut e = spawn(Archetype::Infected, 500.0);
        let near = e.center() + Vec2::new(17.0, 0.0);
        let mut bullets = Vec::new();
        e.update(&ctx(near), Solids::new(&tiles), &mut bullets);
        let away = e.center() + Vec2::new(200.0, 0.0);
        e.update(&ctx(away), Solids::new(&tiles), &mut bullets);
        assert_eq!(e.behavior, Behavior::Approach);
        assert!(e.body.vel.x > 0.0);
    }

    #[test]
    fn test_patrol_bounces_off_wall() {
        let mut tiles = floor();
        tiles.push(Rect::new(540.0, 400.0, 20.0, 200.0));
        let mut e = spawn(Archetype::Infected, 510.0);
        let mut bullets = Vec::new();
        for _ in 0..10 {
            e.update(&ctx(FAR), Solids::new(&tiles), &mut bullets);
        }
        assert_eq!(e.facing, -1.0);
        assert!(e.body.rect().right() <= 540.0);
    }

    #[test]
    fn test_patrol_turns_at_ledge() {
        let tiles = vec![Rect::new(0.0, 600.0, 600.0, 300.0)];
        let mut e = spawn(Archetype::Infected, 560.0);
        let mut bullets = Vec::new();
        for _ in 0..40 {
            e.update(&ctx(FAR), Solids::new(&tiles), &mut bullets);
        }
        assert_eq!(e.facing, -1.0);
        assert!(e.body.on_ground);
        assert!(e.body.rect().left() < 600.0);
    }

    #[test]
    fn test_slow_scales_approach_speed() {
        let tiles = floor();
        let mut e = spawn(Archetype::Infected, 500.0);
        let target = e.center() + Vec2::new(200.0, 0.0);
        let start = e.body.pos.x;
        let mut bullets = Vec::new();
        let c = EnemyContext {
            slow_active: true,
            ..ctx(target)
        };
        e.update(&c, Solids::new(&tiles), &mut bullets);
        assert!(e.slowed);
        assert!((e.body.pos.x - start - 2.3 * SLOW_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn test_drone_fires_when_in_range() {
        let tiles = floor();
        let table = StatsTable::default();
        let mut d = Enemy::new(2, Archetype::Drone, Vec2::new(500.0, 300.0), 1, &table, 0.0);
        let target = d.center() + Vec2::new(200.0, 0.0);
        let mut bullets = Vec::new();
        let a = d.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(a.shots_fired, 1);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].owner, Faction::Enemy);
        assert!((bullets[0].vel.length() - DRONE_BULLET_SPEED).abs() < 1e-3);
        assert_eq!(d.behavior, Behavior::HoverAggro);

        // Cooldown holds fire
        d.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(bullets.len(), 1);
    }

    #[test]
    fn test_boss_enrages_once_and_volleys() {
        let tiles = floor();
        let mut boss = spawn(Archetype::Boss, 500.0);
        let target = boss.center() + Vec2::new(200.0, 0.0);
        let mut bullets = Vec::new();
        boss.apply_damage(boss.max_hp / 2 + 1);

        let first = boss.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert!(first.enraged);
        assert_eq!(boss.boss_phase, BossPhase::Two);
        assert!(bullets.is_empty());

        let second = boss.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert!(!second.enraged);
        assert_eq!(second.shots_fired, 2);
        assert_eq!(bullets.len(), 2);

        boss.update(&ctx(target), Solids::new(&tiles), &mut bullets);
        assert_eq!(bullets.len(), 2);
    }

    #[test]
    fn test_enemy_falling_out_of_world_dies() {
        let table = StatsTable::default();
        let pos = Vec2::new(500.0, FALL_DEATH_Y - 1.0);
        let mut e = Enemy::new(1, Archetype::Infected, pos, 1, &table, 0.0);
        let mut bullets = Vec::new();
        for _ in 0..5 {
            if !e.alive {
                break;
            }
            e.update(&ctx(FAR), Solids::new(&[]), &mut bullets);
        }
        assert!(!e.alive);
        assert!(e.hp > 0);
    }

    proptest! {
        #[test]
        fn prop_enemy_hp_drops_by_damage(damage in 0i32..400) {
            let mut e = spawn(Archetype::Mutant, 100.0);
            let before = e.hp;
            let outcome = e.apply_damage(damage);
            prop_assert_eq!(e.hp, before - damage);
            prop_assert_eq!(e.alive, e.hp > 0);
            prop_assert_eq!(matches!(outcome, DamageOutcome::Killed { .. }), e.hp <= 0);
        }
    }
}
