//! Player state, movement and actions

use glam::Vec2;
use serde::Serialize;

use super::combat::{Bullet, Collidable, DamageOutcome, Damageable, Faction, Slash};
use super::effects::Rgb;
use super::item::ItemKind;
use super::physics::{Body, Solids, move_and_collide, wall_contact};
use super::progression::{Ability, AbilitySet, Progression};
use super::rect::Rect;
use crate::consts::*;
use crate::{facing_sign, lerp};

/// The player's entity id; enemies and items are numbered from 1
pub const PLAYER_ID: u32 = 0;

/// Tick-counted timers, all decremented toward zero every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timers {
    pub slash: u32,
    pub shoot: u32,
    pub neural: u32,
    pub hurt: u32,
    pub invuln: u32,
    pub neural_active: u32,
    pub combo: u32,
    pub level_up: u32,
    pub dash: u32,
    pub dash_cooldown: u32,
}

impl Timers {
    fn tick(&mut self) {
        for t in [
            &mut self.slash,
            &mut self.shoot,
            &mut self.neural,
            &mut self.hurt,
            &mut self.invuln,
            &mut self.neural_active,
            &mut self.combo,
            &mut self.level_up,
            &mut self.dash,
            &mut self.dash_cooldown,
        ] {
            *t = t.saturating_sub(1);
        }
    }
}

/// Movement intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Controls {
    /// Horizontal axis in [-1, 1]
    pub move_x: f32,
    /// Jump pressed this tick
    pub jump: bool,
    pub dash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JumpKind {
    Ground,
    Double,
    Wall,
}

/// Movement events from one update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMotion {
    pub jumped: Option<JumpKind>,
    pub dashed: bool,
    pub landed: bool,
    /// Fell below the death line
    pub fell: bool,
}

/// Result of awarding experience
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelUp {
    pub levels: u32,
    pub unlocked: Vec<Ability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub body: Body,
    pub facing: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub progression: Progression,
    pub abilities: AbilitySet,
    pub timers: Timers,
    /// Position in the 1-2-3 combo cycle (0 before the first swing)
    pub combo: u8,
    /// Direction toward a wall within sensor reach, if any
    pub wall_side: Option<f32>,
    pub jumps_left: u32,
    pub slashes: Vec<Slash>,
    pub dead: bool,
    pub was_on_ground: bool,
    /// Landing squash countdown
    pub landing: u32,
    pub anim_ticks: u64,
}

impl Player {
    /// Fresh level-1 player with its top-left corner at `spawn`
    pub fn new(spawn: Vec2) -> Self {
        let mut abilities = AbilitySet::default();
        let progression = Progression::default();
        abilities.check_unlocks(progression.level);
        Self {
            body: Body::new(spawn, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            facing: 1.0,
            hp: PLAYER_BASE_HP,
            max_hp: PLAYER_BASE_HP,
            ammo: PLAYER_BASE_AMMO,
            max_ammo: PLAYER_BASE_AMMO,
            progression,
            abilities,
            timers: Timers::default(),
            combo: 0,
            wall_side: None,
            jumps_left: 1,
            slashes: Vec::new(),
            dead: false,
            was_on_ground: true,
            landing: 0,
            anim_ticks: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    pub fn level(&self) -> u32 {
        self.progression.level
    }

    pub fn has(&self, ability: Ability) -> bool {
        self.abilities.has(ability)
    }

    /// Damage is ignored while this holds
    pub fn is_invulnerable(&self) -> bool {
        self.timers.invuln > 0 || self.timers.neural_active > 0
    }

    pub fn neural_active(&self) -> bool {
        self.timers.neural_active > 0
    }

    /// Start a melee swing. Returns false while on cooldown.
    pub fn try_slash(&mut self) -> bool {
        if self.timers.slash > 0 {
            return false;
        }
        if self.timers.combo == 0 {
            self.combo = 0;
        }
        self.combo = self.combo % 3 + 1;
        self.timers.combo = COMBO_WINDOW;

        let base = SLASH_BASE_DAMAGE + SLASH_DAMAGE_PER_LEVEL * (self.level() as i32 - 1);
        let damage = if self.combo == 3 {
            (base as f32 * COMBO_FINISHER_MULT) as i32
        } else {
            base
        };
        self.slashes.push(Slash::new(self.center(), self.facing, damage));
        self.timers.slash = SLASH_COOLDOWN;
        true
    }

    /// Fire toward `aim` (world space). `None` on cooldown or empty magazine.
    pub fn try_shoot(&mut self, aim: Vec2) -> Option<Bullet> {
        if self.timers.shoot > 0 || self.ammo == 0 {
            return None;
        }
        self.ammo -= 1;
        self.timers.shoot = SHOOT_COOLDOWN;
        let damage = BULLET_BASE_DAMAGE + BULLET_DAMAGE_PER_LEVEL * (self.level() as i32 - 1);
        let origin = self.center();
        // Aiming at ourselves fires straight ahead
        let aim = if aim.distance_squared(origin) < f32::EPSILON {
            origin + Vec2::new(self.facing, 0.0)
        } else {
            aim
        };
        Some(Bullet::aimed(
            origin,
            aim,
            BULLET_SPEED,
            damage,
            Faction::Player,
            Rgb::CYAN,
        ))
    }

    /// Trigger the neural discharge. Returns false while on cooldown.
    pub fn try_discharge(&mut self) -> bool {
        if self.timers.neural > 0 {
            return false;
        }
        self.timers.neural_active = NEURAL_DURATION;
        self.timers.neural = NEURAL_COOLDOWN;
        true
    }

    pub fn reload(&mut self) {
        self.ammo = self.max_ammo;
    }

    /// Award experience, applying per-level bonuses and ability unlocks
    pub fn gain_xp(&mut self, xp: u32) -> LevelUp {
        let levels = self.progression.gain(xp);
        for _ in 0..levels {
            self.max_hp += LEVEL_UP_MAX_HP;
            self.hp = (self.hp + LEVEL_UP_HEAL).min(self.max_hp);
            self.max_ammo += LEVEL_UP_AMMO;
            self.ammo = (self.ammo + LEVEL_UP_AMMO).min(self.max_ammo);
        }
        if levels > 0 {
            self.timers.level_up = LEVEL_UP_BANNER_TICKS;
        }
        let unlocked = self.abilities.check_unlocks(self.progression.level);
        LevelUp { levels, unlocked }
    }

    /// Apply a pickup, clamped to capacity
    pub fn collect(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Health => self.hp = (self.hp + HEALTH_RESTORE).min(self.max_hp),
            ItemKind::Ammo => self.ammo = (self.ammo + AMMO_RESTORE).min(self.max_ammo),
        }
    }

    /// Move to `pos` at rest with a short invulnerability window
    pub fn place_at(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.body.on_ground = false;
        self.dead = false;
        self.timers.invuln = RESPAWN_INVULN_TICKS;
        self.timers.dash = 0;
        self.wall_side = None;
        self.slashes.clear();
    }

    /// Put the player back in play at `pos` with full health and ammo
    pub fn respawn_at(&mut self, pos: Vec2) {
        self.place_at(pos);
        self.hp = self.max_hp;
        self.ammo = self.max_ammo;
    }

    /// Run, dash, jump, integrate and collide for one tick
    pub fn update(&mut self, controls: &Controls, solids: Solids<'_>, world_width: f32) -> PlayerMotion {
        let mut motion = PlayerMotion::default();
        self.timers.tick();

        if self.body.on_ground {
            self.jumps_left = if self.has(Ability::DoubleJump) { 2 } else { 1 };
        }

        self.wall_side = if self.body.vel.y != 0.0 || !self.body.on_ground {
            wall_contact(&self.body, solids, WALL_PROBE_REACH)
        } else {
            None
        };

        let dashing = self.timers.dash > 0;
        if controls.move_x != 0.0 {
            self.facing = facing_sign(controls.move_x);
            if !dashing {
                let target = controls.move_x.clamp(-1.0, 1.0) * RUN_SPEED;
                self.body.vel.x = lerp(self.body.vel.x, target, RUN_ACCEL);
            }
        } else if !dashing {
            self.body.vel.x = lerp(self.body.vel.x, 0.0, RUN_DECEL);
        }

        if dashing {
            self.body.vel.x = self.facing * DASH_SPEED;
            self.body.vel.y *= 0.5;
        } else if controls.dash && self.has(Ability::Dash) && self.timers.dash_cooldown == 0 {
            self.timers.dash = DASH_TICKS;
            self.timers.dash_cooldown = DASH_COOLDOWN;
            motion.dashed = true;
        }

        if controls.jump {
            motion.jumped = self.try_jump();
        }

        self.body.apply_gravity();
        move_and_collide(&mut self.body, solids);
        let max_x = (world_width - self.body.size.x).max(0.0);
        self.body.pos.x = self.body.pos.x.clamp(0.0, max_x);

        if self.body.pos.y > FALL_DEATH_Y && !self.dead {
            self.dead = true;
            motion.fell = true;
        }

        if self.body.on_ground {
            if !self.was_on_ground && self.body.vel.y >= 0.0 {
                self.landing = LANDING_TICKS;
                motion.landed = true;
            }
            self.landing = self.landing.saturating_sub(1);
        } else {
            self.landing = 0;
        }
        self.was_on_ground = self.body.on_ground;
        self.anim_ticks += 1;

        for slash in &mut self.slashes {
            slash.tick();
        }
        self.slashes.retain(Slash::is_alive);

        motion
    }

    fn try_jump(&mut self) -> Option<JumpKind> {
        let dashing = self.timers.dash > 0;
        if self.body.on_ground {
            self.body.vel.y = JUMP_VELOCITY;
            self.body.on_ground = false;
            self.jumps_left = self.jumps_left.saturating_sub(1);
            return Some(JumpKind::Ground);
        }
        if self.has(Ability::DoubleJump) && self.jumps_left > 0 && !dashing {
            self.body.vel.y = JUMP_VELOCITY;
            self.jumps_left -= 1;
            return Some(JumpKind::Double);
        }
        if self.has(Ability::WallJump) && !dashing {
            if let Some(side) = self.wall_side {
                self.body.vel.y = WALL_JUMP_VELOCITY;
                self.body.vel.x = -side * WALL_JUMP_KICK;
                self.facing = -side;
                self.wall_side = None;
                return Some(JumpKind::Wall);
            }
        }
        None
    }
}

impl Collidable for Player {
    fn entity_id(&self) -> u32 {
        PLAYER_ID
    }

    fn hitbox(&self) -> Rect {
        self.body.rect()
    }
}

impl Damageable for Player {
    fn is_alive(&self) -> bool {
        !self.dead
    }

    /// HP is clamped at zero; reaching zero kills
    fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        self.hp = (self.hp - amount.max(0)).max(0);
        self.timers.hurt = HURT_TICKS;
        self.timers.invuln = INVULN_TICKS;
        if self.hp == 0 {
            self.dead = true;
            DamageOutcome::Killed { xp: 0 }
        } else {
            DamageOutcome::Hurt
        }
    }
}
