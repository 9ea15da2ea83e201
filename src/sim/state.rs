//! Game state and lifecycle flows
//!
//! [`GameState`] is the single owner of everything the simulation mutates:
//! player, level, projectiles, progression counters, feedback and the RNG.
//! Nothing lives in statics, so two states never interfere.

use std::collections::HashSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::Bullet;
use super::effects::{Effects, GameEvent, GameFeel, ParticleBurst, Rgb};
use super::enemy::{Archetype, StatsTable};
use super::item::{Item, roll_drop};
use super::level::{CheckpointProgress, Level, LevelSource, procedural_blueprint};
use super::player::Player;
use super::progression::Ability;
use crate::Settings;
use crate::consts::*;
use crate::lerp;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen; confirm starts a new run
    Title,
    Playing,
    Paused,
    /// Player died; confirm respawns at the last checkpoint
    Dead,
    /// Final boss beaten
    Won,
}

/// Eased camera following the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Camera {
    /// Top-left corner of the view in world space
    pub pos: Vec2,
}

impl Camera {
    /// Ease toward `focus`, clamped to the world
    pub fn follow(&mut self, focus: Vec2, viewport: Vec2, world_width: f32) {
        let target = Vec2::new(
            focus.x - viewport.x / 2.0,
            focus.y - viewport.y / 2.0 + CAMERA_Y_OFFSET,
        );
        let max_x = (world_width - viewport.x).max(0.0);
        self.pos.x = lerp(self.pos.x, target.x, CAMERA_EASE).clamp(0.0, max_x);
        self.pos.y = lerp(self.pos.y, target.y, CAMERA_EASE).clamp(0.0, CAMERA_MAX_Y);
    }
}

/// Exploration cell containing `p`
pub fn explore_cell(p: Vec2) -> (i32, i32) {
    (
        (p.x / EXPLORE_CELL_W).floor() as i32,
        (p.y / EXPLORE_CELL_H).floor() as i32,
    )
}

/// Complete simulation context
pub struct GameState {
    pub phase: Phase,
    /// Current zone, 1-based
    pub zone: u32,
    pub score: u64,
    /// Gameplay ticks simulated (frozen by pause and hitstop)
    pub time_ticks: u64,

    pub player: Player,
    pub level: Level,
    pub bullets: Vec<Bullet>,
    pub checkpoint: CheckpointProgress,

    pub camera: Camera,
    pub viewport: Vec2,
    /// Discovered exploration cells for the minimap
    pub explored: HashSet<(i32, i32)>,
    /// Ticks left on the zone name banner
    pub zone_banner: u32,
    /// Fade-in alpha after a level build
    pub fade_in: u32,
    pub show_debug: bool,
    pub show_ability_menu: bool,

    pub feel: GameFeel,
    events: Vec<GameEvent>,
    rng: Pcg32,
    stats: StatsTable,
    source: Box<dyn LevelSource>,
    next_id: u32,
}

impl GameState {
    /// New state on the title screen with zone 1 loaded behind it
    pub fn new(settings: &Settings, source: Box<dyn LevelSource>, stats: StatsTable) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let mut next_id = 1;
        let blueprint = source.blueprint(1).unwrap_or_else(|| procedural_blueprint(1));
        let level = Level::build(blueprint, &stats, &mut rng, &mut next_id);
        let player = Player::new(level.checkpoint(0));

        let mut state = Self {
            phase: Phase::Title,
            zone: 1,
            score: 0,
            time_ticks: 0,
            player,
            level,
            bullets: Vec::new(),
            checkpoint: CheckpointProgress::default(),
            camera: Camera::default(),
            viewport: Vec2::new(settings.viewport_width, settings.viewport_height),
            explored: HashSet::new(),
            zone_banner: ZONE_BANNER_TICKS,
            fade_in: FADE_IN_START,
            show_debug: settings.debug_overlay,
            show_ability_menu: false,
            feel: GameFeel::new(settings),
            events: Vec::new(),
            rng,
            stats,
            source,
            next_id,
        };
        state.mark_explored();
        state
    }

    /// Get next entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild `zone` from the level source (or the procedural layout)
    fn load_zone(&mut self, zone: u32) {
        let blueprint = self.source.blueprint(zone).unwrap_or_else(|| {
            log::info!("Zone {zone}: no level data, using procedural layout");
            procedural_blueprint(zone)
        });
        self.level = Level::build(blueprint, &self.stats, &mut self.rng, &mut self.next_id);
        self.zone = zone;
        self.bullets.clear();
        self.feel.clear();
        self.explored.clear();
        self.zone_banner = ZONE_BANNER_TICKS;
        self.fade_in = FADE_IN_START;
    }

    /// Rebuild the current zone and respawn at the last checkpoint reached
    pub fn checkpoint_reset(&mut self) {
        self.load_zone(self.zone);
        let spawn = self.level.checkpoint(self.checkpoint.index());
        self.player.respawn_at(spawn);
        self.mark_explored();
        log::info!(
            "Respawned in zone {} at checkpoint {}",
            self.zone,
            self.checkpoint.index()
        );
    }

    /// New run: level-1 player, zone 1, score and checkpoints cleared
    pub fn full_restart(&mut self) {
        self.zone = 1;
        self.score = 0;
        self.time_ticks = 0;
        self.checkpoint.reset();
        self.show_ability_menu = false;
        self.player = Player::new(Vec2::new(DEFAULT_SPAWN.0, DEFAULT_SPAWN.1));
        self.checkpoint_reset();
        log::info!("Started a new run");
    }

    /// Move on after the zone boss falls, or win after the final zone
    pub fn advance_zone(&mut self) {
        if self.zone >= FINAL_ZONE {
            self.phase = Phase::Won;
            self.emit(GameEvent::Victory);
            log::info!(
                "Victory: score {}, level {}",
                self.score,
                self.player.level()
            );
            return;
        }

        let next = self.zone + 1;
        self.player.hp = (self.player.hp + ZONE_ADVANCE_HEAL).min(self.player.max_hp);
        self.player.ammo = self.player.max_ammo;
        self.load_zone(next);
        self.checkpoint.reset();
        let spawn = self.level.checkpoint(0);
        self.player.place_at(spawn);
        self.mark_explored();
        self.emit(GameEvent::ZoneAdvanced(next));
        log::info!("Advanced to zone {next}: {}", self.level.zone_name);
    }

    /// External unlock hook (keycards have no other source).
    ///
    /// Returns true if the ability was newly granted.
    pub fn grant_ability(&mut self, ability: Ability) -> bool {
        let newly = self.player.abilities.grant(ability);
        if newly {
            log::info!("Granted {}", ability.display_name());
            self.emit(GameEvent::AbilityUnlocked(ability));
        }
        newly
    }

    /// Credit a kill: score, XP (with level-up fallout) and a possible drop
    pub fn award_kill(&mut self, xp: u32, archetype: Archetype, drop_at: Vec2) {
        self.score += u64::from(xp);
        self.emit(GameEvent::EnemyKilled(archetype));

        let up = self.player.gain_xp(xp);
        if up.levels > 0 {
            let level = self.player.level();
            log::info!("Player reached level {level}");
            self.emit(GameEvent::LevelUp(level));
            self.feel.spawn_particles(
                self.player.center(),
                Rgb::GOLD,
                ParticleBurst::new(22, 5.0, 55, 7.0),
            );
        }
        for ability in up.unlocked {
            log::info!("Unlocked {}", ability.display_name());
            self.emit(GameEvent::AbilityUnlocked(ability));
        }

        if let Some(kind) = roll_drop(&mut self.rng) {
            let id = self.next_entity_id();
            let bob = self.rng.random_range(0.0..std::f32::consts::TAU);
            self.level.items.push(Item::new(id, drop_at, kind, bob));
        }
    }

    /// Record the exploration cell under the player
    pub fn mark_explored(&mut self) {
        self.explored.insert(explore_cell(self.player.body.pos));
    }
}
