//! Read-only draw state
//!
//! The renderer never reaches into [`GameState`]; it gets a [`DrawState`]
//! captured once per frame. Everything here is plain data and serializes
//! for replay dumps and debugging.

use glam::Vec2;
use serde::Serialize;

use super::combat::{Collidable, Faction};
use super::effects::{Particle, Rgb};
use super::enemy::{Archetype, BossPhase, Enemy};
use super::item::ItemKind;
use super::player::Player;
use super::progression::Ability;
use super::rect::Rect;
use super::state::{GameState, Phase};

/// Animation the renderer should play for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationCue {
    Idle,
    Run,
    Airborne,
    Shoot,
    Slash,
}

impl AnimationCue {
    /// Infer from cooldowns, velocity and ground state
    pub fn for_player(player: &Player) -> Self {
        if player.timers.slash > 0 {
            AnimationCue::Slash
        } else if player.timers.shoot > 0 {
            AnimationCue::Shoot
        } else if !player.body.on_ground {
            AnimationCue::Airborne
        } else if player.body.vel.x.abs() > 0.6 {
            AnimationCue::Run
        } else {
            AnimationCue::Idle
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub rect: Rect,
    pub facing: f32,
    pub cue: AnimationCue,
    /// False on the off-frames of the hurt blink
    pub visible: bool,
    pub neural: bool,
    pub dashing: bool,
    pub wall_side: Option<f32>,
}

impl PlayerView {
    fn capture(player: &Player) -> Self {
        let hurt = player.timers.hurt;
        Self {
            rect: player.hitbox(),
            facing: player.facing,
            cue: AnimationCue::for_player(player),
            visible: !(hurt > 0 && (hurt / 3) % 2 == 0),
            neural: player.neural_active(),
            dashing: player.timers.dash > 0,
            wall_side: player.wall_side,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub rect: Rect,
    pub archetype: Archetype,
    pub color: Rgb,
    pub facing: f32,
    pub hp_ratio: f32,
    pub hurt: bool,
    pub slowed: bool,
    /// Telegraph progress while winding up a strike
    pub windup: Option<f32>,
    pub boss_phase: BossPhase,
}

impl From<&Enemy> for EnemyView {
    fn from(e: &Enemy) -> Self {
        Self {
            id: e.id,
            rect: e.hitbox(),
            archetype: e.archetype,
            color: e.color,
            facing: e.facing,
            hp_ratio: e.hp_ratio(),
            hurt: e.hurt > 0,
            slowed: e.slowed,
            windup: e.windup_progress(),
            boss_phase: e.boss_phase,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    pub hostile: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SlashView {
    pub rect: Rect,
    pub facing: f32,
    /// 0 at the start of the swing, 1 at the end
    pub progress: f32,
}

/// Floating damage number with its fade applied
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumberView {
    pub pos: Vec2,
    pub value: i32,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ItemView {
    pub pos: Vec2,
    pub kind: ItemKind,
}

/// Heads-up display values
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub hp: i32,
    pub max_hp: i32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub level: u32,
    pub score: u64,
    pub zone: u32,
    pub zone_name: String,
    /// Ticks left on the zone banner
    pub zone_banner: u32,
    pub level_up_banner: u32,
    pub fade_in: u32,
    /// Boss health while the boss lives
    pub boss_hp: Option<f32>,
    pub abilities: Vec<(Ability, bool)>,
    pub neural_cooldown: u32,
    pub combo: u8,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct DrawState {
    pub phase: Phase,
    /// Camera top-left including shake
    pub camera: Vec2,
    pub background: Rgb,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub slashes: Vec<SlashView>,
    pub items: Vec<ItemView>,
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<NumberView>,
    pub tiles: Vec<Rect>,
    /// Gates still closed to the player
    pub gates: Vec<Rect>,
    pub checkpoints: Vec<Vec2>,
    pub explored: Vec<(i32, i32)>,
    pub hud: Hud,
    pub show_debug: bool,
    pub show_ability_menu: bool,
}

impl DrawState {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let mut explored: Vec<_> = state.explored.iter().copied().collect();
        explored.sort_unstable();

        Self {
            phase: state.phase,
            camera: state.camera.pos + state.feel.camera_offset(),
            background: state.level.background,
            player: PlayerView::capture(player),
            enemies: state
                .level
                .enemies
                .iter()
                .filter(|e| e.alive)
                .map(EnemyView::from)
                .collect(),
            bullets: state
                .bullets
                .iter()
                .filter(|b| b.alive)
                .map(|b| BulletView {
                    pos: b.pos,
                    vel: b.vel,
                    color: b.color,
                    hostile: b.owner == Faction::Enemy,
                })
                .collect(),
            slashes: player
                .slashes
                .iter()
                .map(|s| SlashView {
                    rect: s.hitbox(),
                    facing: s.facing,
                    progress: s.progress(),
                })
                .collect(),
            items: state
                .level
                .items
                .iter()
                .filter(|i| i.alive)
                .map(|i| ItemView {
                    pos: i.display_pos(),
                    kind: i.kind,
                })
                .collect(),
            particles: state.feel.particles().to_vec(),
            damage_numbers: state
                .feel
                .damage_numbers()
                .iter()
                .map(|n| NumberView {
                    pos: n.pos,
                    value: n.value,
                    color: n.color,
                    alpha: n.alpha(),
                })
                .collect(),
            tiles: state.level.tiles.clone(),
            gates: state.level.blocking_gates(&player.abilities),
            checkpoints: state.level.checkpoints.clone(),
            explored,
            hud: Hud {
                hp: player.hp,
                max_hp: player.max_hp,
                ammo: player.ammo,
                max_ammo: player.max_ammo,
                xp: player.progression.xp,
                xp_to_next: player.progression.xp_to_next,
                level: player.level(),
                score: state.score,
                zone: state.zone,
                zone_name: state.level.zone_name.clone(),
                zone_banner: state.zone_banner,
                level_up_banner: player.timers.level_up,
                fade_in: state.fade_in,
                boss_hp: state
                    .level
                    .boss()
                    .filter(|b| b.alive)
                    .map(Enemy::hp_ratio),
                abilities: player.abilities.iter().collect(),
                neural_cooldown: player.timers.neural,
                combo: player.combo,
            },
            show_debug: state.show_debug,
            show_ability_menu: state.show_ability_menu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use crate::sim::enemy::StatsTable;
    use crate::sim::level::ProceduralLevels;

    fn state() -> GameState {
        GameState::new(
            &Settings::default(),
            Box::new(ProceduralLevels),
            StatsTable::default(),
        )
    }

    #[test]
    fn test_animation_cue_priority() {
        let mut p = Player::new(Vec2::ZERO);
        p.body.on_ground = true;
        assert_eq!(AnimationCue::for_player(&p), AnimationCue::Idle);
        p.body.vel.x = 3.0;
        assert_eq!(AnimationCue::for_player(&p), AnimationCue::Run);
        p.body.on_ground = false;
        assert_eq!(AnimationCue::for_player(&p), AnimationCue::Airborne);
        p.timers.shoot = 5;
        assert_eq!(AnimationCue::for_player(&p), AnimationCue::Shoot);
        p.timers.slash = 5;
        assert_eq!(AnimationCue::for_player(&p), AnimationCue::Slash);
    }

    #[test]
    fn test_hurt_blink() {
        let mut p = Player::new(Vec2::ZERO);
        p.timers.hurt = 17;
        assert!(PlayerView::capture(&p).visible);
        p.timers.hurt = 18;
        assert!(!PlayerView::capture(&p).visible);
        p.timers.hurt = 0;
        assert!(PlayerView::capture(&p).visible);
    }

    #[test]
    fn test_capture_reflects_state() {
        let state = state();
        let draw = DrawState::capture(&state);
        assert_eq!(draw.phase, Phase::Title);
        assert_eq!(draw.enemies.len(), state.level.enemies.len());
        assert_eq!(draw.tiles.len(), state.level.tiles.len());
        assert_eq!(draw.hud.zone_name, "ZONE I: RUINED CITY");
        assert_eq!(draw.hud.boss_hp, Some(1.0));
        assert_eq!(draw.hud.abilities.len(), Ability::ALL.len());
        assert!(serde_json::to_string(&draw).is_ok());
    }

    #[test]
    fn test_capture_includes_feedback() {
        use crate::sim::effects::{Effects, ParticleBurst};

        let mut state = state();
        state
            .feel
            .spawn_damage_number(Vec2::new(10.0, 10.0), 42, Rgb::CYAN);
        state
            .feel
            .spawn_particles(Vec2::ZERO, Rgb::PINK, ParticleBurst::new(5, 2.0, 10, 3.0));
        let draw = DrawState::capture(&state);
        assert_eq!(draw.damage_numbers.len(), 1);
        assert_eq!(draw.damage_numbers[0].value, 42);
        assert_eq!(draw.damage_numbers[0].alpha, 1.0);
        assert_eq!(draw.particles.len(), 5);
    }

    #[test]
    fn test_dead_boss_hides_boss_bar() {
        let mut state = state();
        if let Some(boss) = state.level.enemies.iter_mut().find(|e| e.is_boss()) {
            boss.alive = false;
        }
        let draw = DrawState::capture(&state);
        assert_eq!(draw.hud.boss_hp, None);
        assert_eq!(draw.enemies.len(), state.level.enemies.len() - 1);
    }
}
