//! Game-feel feedback: hitstop, camera shake, damage numbers and particles
//!
//! The simulation only *requests* feedback through the [`Effects`] trait and
//! never reads anything back except whether hitstop is holding the tick.
//! [`GameFeel`] is the in-process implementation; everything it owns is
//! cosmetic and keeps animating during hitstop. Sound cues leave the
//! simulation as [`GameEvent`]s the host drains once per tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Archetype;
use super::item::ItemKind;
use super::player::JumpKind;
use super::progression::Ability;
use crate::Settings;
use crate::consts::{DAMAGE_NUMBER_TICKS, PARTICLE_DRAG, PARTICLE_GRAVITY, SHAKE_DECAY};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const CYAN: Rgb = Rgb(0, 230, 220);
    pub const PINK: Rgb = Rgb(255, 0, 120);
    pub const PURPLE: Rgb = Rgb(170, 0, 255);
    pub const RED: Rgb = Rgb(255, 55, 55);
    pub const GOLD: Rgb = Rgb(255, 205, 0);
    pub const GREEN: Rgb = Rgb(40, 255, 100);
}

/// Shape of a particle burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBurst {
    pub count: u32,
    /// Maximum initial speed
    pub spread: f32,
    /// Lifetime in ticks
    pub life: u32,
    pub size: f32,
}

impl ParticleBurst {
    pub const fn new(count: u32, spread: f32, life: u32, size: f32) -> Self {
        Self {
            count,
            spread,
            life,
            size,
        }
    }
}

/// One-way feedback requests issued by the simulation
pub trait Effects {
    /// Freeze gameplay for at least `ticks` ticks
    fn trigger_hitstop(&mut self, ticks: u32);
    /// Shake the camera with at least `strength` pixels of offset
    fn trigger_shake(&mut self, strength: f32);
    fn spawn_damage_number(&mut self, pos: Vec2, amount: i32, color: Rgb);
    fn spawn_particles(&mut self, pos: Vec2, color: Rgb, burst: ParticleBurst);
}

/// Discrete gameplay events, mostly consumed as audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Jumped(JumpKind),
    Dashed,
    Slashed,
    Shot,
    Discharged,
    Reloaded,
    PlayerHurt,
    PlayerDied,
    EnemyKilled(Archetype),
    BossEnraged,
    ItemCollected(ItemKind),
    LevelUp(u32),
    AbilityUnlocked(Ability),
    CheckpointReached(usize),
    ZoneAdvanced(u32),
    Victory,
}

/// A cosmetic particle
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

/// Floating damage number
#[derive(Debug, Clone, Serialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub value: i32,
    pub color: Rgb,
    pub life: u32,
    vy: f32,
}

impl DamageNumber {
    /// Remaining visibility in [0, 1] for fading
    pub fn alpha(&self) -> f32 {
        self.life as f32 / DAMAGE_NUMBER_TICKS as f32
    }
}

/// Default effects implementation owned by the game state
#[derive(Debug, Clone)]
pub struct GameFeel {
    hitstop: u32,
    shake_strength: f32,
    shake_offset: Vec2,
    shake_enabled: bool,
    damage_numbers_enabled: bool,
    max_particles: usize,
    damage_numbers: Vec<DamageNumber>,
    particles: Vec<Particle>,
    rng: Pcg32,
}

impl GameFeel {
    pub fn new(settings: &Settings) -> Self {
        Self {
            hitstop: 0,
            shake_strength: 0.0,
            shake_offset: Vec2::ZERO,
            shake_enabled: settings.effective_screen_shake(),
            damage_numbers_enabled: settings.damage_numbers,
            max_particles: settings.max_particles(),
            damage_numbers: Vec::new(),
            particles: Vec::new(),
            // Separate stream so cosmetics never perturb gameplay rolls
            rng: Pcg32::seed_from_u64(settings.seed ^ 0x9e37_79b9_7f4a_7c15),
        }
    }

    /// Advance one frame: count down hitstop, decay shake, age numbers and particles
    pub fn update(&mut self) {
        self.hitstop = self.hitstop.saturating_sub(1);

        if self.shake_strength > 0.1 {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            self.shake_offset = Vec2::new(angle.cos(), angle.sin()) * self.shake_strength;
            self.shake_strength *= SHAKE_DECAY;
        } else {
            self.shake_offset = Vec2::ZERO;
            self.shake_strength = 0.0;
        }

        for number in &mut self.damage_numbers {
            number.life = number.life.saturating_sub(1);
            number.pos.y += number.vy;
            number.vy *= 0.92;
        }
        self.damage_numbers.retain(|n| n.life > 0);

        for p in &mut self.particles {
            p.pos += p.vel;
            p.vel.y += PARTICLE_GRAVITY;
            p.vel.x *= PARTICLE_DRAG;
            p.life = p.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }

    /// True while gameplay should be frozen
    pub fn hitstop_active(&self) -> bool {
        self.hitstop > 0
    }

    pub fn hitstop_remaining(&self) -> u32 {
        self.hitstop
    }

    pub fn shake_strength(&self) -> f32 {
        self.shake_strength
    }

    /// Offset the renderer adds to the camera this frame
    pub fn camera_offset(&self) -> Vec2 {
        self.shake_offset
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn damage_numbers(&self) -> &[DamageNumber] {
        &self.damage_numbers
    }

    /// Drop particles and numbers (level rebuild)
    pub fn clear(&mut self) {
        self.particles.clear();
        self.damage_numbers.clear();
        self.hitstop = 0;
    }
}

impl Effects for GameFeel {
    fn trigger_hitstop(&mut self, ticks: u32) {
        self.hitstop = self.hitstop.max(ticks);
    }

    fn trigger_shake(&mut self, strength: f32) {
        if self.shake_enabled {
            self.shake_strength = self.shake_strength.max(strength);
        }
    }

    fn spawn_damage_number(&mut self, pos: Vec2, amount: i32, color: Rgb) {
        if !self.damage_numbers_enabled {
            return;
        }
        self.damage_numbers.push(DamageNumber {
            pos,
            value: amount,
            color,
            life: DAMAGE_NUMBER_TICKS,
            vy: -1.8,
        });
    }

    fn spawn_particles(&mut self, pos: Vec2, color: Rgb, burst: ParticleBurst) {
        let room = self.max_particles.saturating_sub(self.particles.len());
        for _ in 0..(burst.count as usize).min(room) {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(burst.spread * 0.3..=burst.spread);
            self.particles.push(Particle {
                pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: burst.life,
                max_life: burst.life,
                size: burst.size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitstop_takes_max_and_counts_down() {
        let mut feel = GameFeel::new(&Settings::default());
        feel.trigger_hitstop(2);
        feel.trigger_hitstop(4);
        feel.trigger_hitstop(1);
        assert_eq!(feel.hitstop_remaining(), 4);
        for _ in 0..4 {
            assert!(feel.hitstop_active());
            feel.update();
        }
        assert!(!feel.hitstop_active());
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut feel = GameFeel::new(&Settings::default());
        feel.trigger_shake(6.0);
        feel.update();
        assert!((feel.camera_offset().length() - 6.0).abs() < 0.001);
        for _ in 0..60 {
            feel.update();
        }
        assert_eq!(feel.shake_strength(), 0.0);
        assert_eq!(feel.camera_offset(), Vec2::ZERO);
    }

    #[test]
    fn test_shake_disabled_by_reduced_motion() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut feel = GameFeel::new(&settings);
        feel.trigger_shake(6.0);
        assert_eq!(feel.shake_strength(), 0.0);
    }

    #[test]
    fn test_particles_respect_cap_and_expire() {
        let settings = Settings {
            particle_cap: 10,
            ..Settings::default()
        };
        let mut feel = GameFeel::new(&settings);
        feel.spawn_particles(Vec2::ZERO, Rgb::GOLD, ParticleBurst::new(30, 5.0, 3, 4.0));
        assert_eq!(feel.particles().len(), 10);
        for _ in 0..3 {
            feel.update();
        }
        assert!(feel.particles().is_empty());
    }

    #[test]
    fn test_damage_numbers_rise_and_fade() {
        let mut feel = GameFeel::new(&Settings::default());
        feel.spawn_damage_number(Vec2::new(10.0, 100.0), 50, Rgb::CYAN);
        feel.update();
        let n = &feel.damage_numbers()[0];
        assert!(n.pos.y < 100.0);
        assert!(n.alpha() < 1.0);
        for _ in 0..DAMAGE_NUMBER_TICKS {
            feel.update();
        }
        assert!(feel.damage_numbers().is_empty());
    }
}
