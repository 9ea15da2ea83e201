//! Fixed timestep simulation tick
//!
//! One call advances the game by exactly one 60 Hz step. Within a playing
//! tick the order is fixed: player, projectiles, melee, enemies, pickups,
//! camera and checkpoints, then the zone transition check. Dead entities
//! are only swept at the very end.

use glam::Vec2;

use super::combat::{
    BulletFate, Collidable, DamageOutcome, Damageable, Faction, Hit, resolve_bullets,
    resolve_slashes,
};
use super::effects::{Effects, GameEvent, ParticleBurst, Rgb};
use super::enemy::{Archetype, EnemyAction, EnemyContext};
use super::physics::Solids;
use super::player::Controls;
use super::state::{GameState, Phase};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
///
/// Buttons are edge-triggered except `move_x`, which is the held axis.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]
    pub move_x: f32,
    pub jump: bool,
    pub dash: bool,
    /// Melee swing
    pub slash: bool,
    pub shoot: bool,
    /// Neural discharge special
    pub discharge: bool,
    pub reload: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start / respawn / restart depending on phase
    pub confirm: bool,
    /// Leave a paused game for the title screen
    pub quit_to_title: bool,
    pub toggle_abilities: bool,
    pub toggle_debug: bool,
    /// Pointer position in world space, used for ranged aim
    pub aim: Vec2,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Cosmetics run in every phase, hitstop included
    state.feel.update();

    handle_phase_input(state, input);
    if state.phase != Phase::Playing {
        return;
    }

    state.zone_banner = state.zone_banner.saturating_sub(1);
    state.fade_in = state.fade_in.saturating_sub(FADE_IN_STEP);

    if state.feel.hitstop_active() {
        return;
    }
    state.time_ticks += 1;

    update_player(state, input);
    update_bullets(state);
    resolve_melee(state);
    update_enemies(state);
    collect_items(state);

    state.mark_explored();
    if let Some(index) = state
        .checkpoint
        .update(state.player.center(), &state.level.checkpoints)
    {
        log::info!("Checkpoint {index} reached in zone {}", state.zone);
        state.emit(GameEvent::CheckpointReached(index));
    }
    let focus = state.player.center();
    state
        .camera
        .follow(focus, state.viewport, state.level.world_width);

    if state.player.dead {
        state.phase = Phase::Dead;
        state.emit(GameEvent::PlayerDied);
        log::info!("Player died in zone {} (score {})", state.zone, state.score);
    } else if state.level.boss_defeated()
        && state.player.body.pos.x > state.level.world_width - ZONE_EXIT_MARGIN
    {
        state.advance_zone();
    }

    // Sweep; a dead boss stays so the exit stays open
    state.bullets.retain(|b| b.alive);
    state.level.enemies.retain(|e| e.alive || e.is_boss());
    state.level.items.retain(|i| i.alive);
}

fn handle_phase_input(state: &mut GameState, input: &TickInput) {
    if input.pause {
        match state.phase {
            Phase::Playing => {
                state.phase = Phase::Paused;
                log::info!("Paused");
                return;
            }
            Phase::Paused => {
                state.phase = Phase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    match state.phase {
        Phase::Paused if input.quit_to_title => {
            state.phase = Phase::Title;
            log::info!("Quit to title");
        }
        Phase::Title | Phase::Won if input.confirm => {
            state.full_restart();
            state.phase = Phase::Playing;
        }
        Phase::Dead if input.confirm => {
            state.checkpoint_reset();
            state.phase = Phase::Playing;
        }
        _ => {}
    }

    if input.toggle_debug && matches!(state.phase, Phase::Playing | Phase::Paused) {
        state.show_debug = !state.show_debug;
    }
    if input.toggle_abilities && state.phase == Phase::Playing {
        state.show_ability_menu = !state.show_ability_menu;
    }
}

fn update_player(state: &mut GameState, input: &TickInput) {
    if input.reload && state.player.ammo < state.player.max_ammo {
        state.player.reload();
        state.emit(GameEvent::Reloaded);
    }
    if input.slash && state.player.try_slash() {
        state.emit(GameEvent::Slashed);
    }
    if input.discharge && state.player.try_discharge() {
        let center = state.player.center();
        state
            .feel
            .spawn_particles(center, Rgb::PURPLE, ParticleBurst::new(30, 6.0, 40, 6.0));
        state.emit(GameEvent::Discharged);
    }
    if input.shoot {
        if let Some(bullet) = state.player.try_shoot(input.aim) {
            state
                .feel
                .spawn_particles(bullet.pos, Rgb::CYAN, ParticleBurst::new(4, 2.0, 10, 3.0));
            state.bullets.push(bullet);
            state.emit(GameEvent::Shot);
        }
    }

    let controls = Controls {
        move_x: input.move_x,
        jump: input.jump,
        dash: input.dash,
    };
    let gates = state.level.blocking_gates(&state.player.abilities);
    let solids = Solids::new(&state.level.tiles).with_extra(&gates);
    let motion = state
        .player
        .update(&controls, solids, state.level.world_width);

    if let Some(kind) = motion.jumped {
        state.emit(GameEvent::Jumped(kind));
    }
    if motion.dashed {
        state.emit(GameEvent::Dashed);
    }
}

fn update_bullets(state: &mut GameState) {
    let mut sparks = Vec::new();
    for bullet in state.bullets.iter_mut().filter(|b| b.alive) {
        let fate = bullet.advance(
            &state.level.grid,
            &state.level.tiles,
            state.level.world_width,
        );
        if let BulletFate::HitTile(at) = fate {
            sparks.push((at, bullet.color));
        }
    }
    for (at, color) in sparks {
        state
            .feel
            .spawn_particles(at, color, ParticleBurst::new(5, 2.0, 12, 3.0));
    }

    let hits = resolve_bullets(
        &mut state.bullets,
        Faction::Player,
        &mut state.level.enemies,
    );
    apply_enemy_hits(state, &hits, HITSTOP_SHOT, SHAKE_SHOT);

    let hits = resolve_bullets(
        &mut state.bullets,
        Faction::Enemy,
        std::slice::from_mut(&mut state.player),
    );
    for hit in hits.iter().filter(|h| h.outcome.landed()) {
        state
            .feel
            .spawn_particles(hit.at, Rgb::RED, ParticleBurst::new(8, 3.0, 20, 4.0));
        state.emit(GameEvent::PlayerHurt);
    }
}

fn resolve_melee(state: &mut GameState) {
    let hits = resolve_slashes(&mut state.player.slashes, &mut state.level.enemies);
    apply_enemy_hits(state, &hits, HITSTOP_SLASH, SHAKE_SLASH);
}

/// Feedback and rewards for damage the player dealt
fn apply_enemy_hits(state: &mut GameState, hits: &[Hit], hitstop: u32, shake: f32) {
    let mut kills: Vec<(u32, Archetype, Vec2)> = Vec::new();
    for hit in hits {
        if !hit.outcome.landed() {
            continue;
        }
        state.feel.trigger_hitstop(hitstop);
        state.feel.trigger_shake(shake);
        state.feel.spawn_damage_number(hit.at, hit.damage, Rgb::CYAN);
        state
            .feel
            .spawn_particles(hit.at, Rgb::PINK, ParticleBurst::new(10, 4.0, 24, 4.0));

        if let DamageOutcome::Killed { xp } = hit.outcome {
            if let Some(enemy) = state.level.enemies.iter().find(|e| e.id == hit.target) {
                let rect = enemy.hitbox();
                kills.push((xp, enemy.archetype, Vec2::new(rect.center().x, rect.y)));
            }
        }
    }
    for (xp, archetype, at) in kills {
        log::debug!("Killed {} for {xp} XP", archetype.key());
        state.award_kill(xp, archetype, at);
    }
}

fn update_enemies(state: &mut GameState) {
    let ctx = EnemyContext {
        target: state.player.center(),
        slow_active: state.player.neural_active(),
        time_ticks: state.time_ticks,
    };
    let solids = Solids::new(&state.level.tiles);
    let actions: Vec<EnemyAction> = state
        .level
        .enemies
        .iter_mut()
        .filter(|e| e.alive)
        .map(|e| e.update(&ctx, solids, &mut state.bullets))
        .collect();

    for action in actions {
        if action.enraged {
            state.feel.trigger_shake(SHAKE_MELEE_HIT);
            state.emit(GameEvent::BossEnraged);
        }
        let Some(damage) = action.strike else {
            continue;
        };
        if state.player.apply_damage(damage).landed() {
            let center = state.player.center();
            state.feel.trigger_shake(SHAKE_MELEE_HIT);
            state
                .feel
                .spawn_damage_number(center, damage, Rgb::RED);
            state
                .feel
                .spawn_particles(center, Rgb::RED, ParticleBurst::new(12, 4.0, 26, 5.0));
            state.emit(GameEvent::PlayerHurt);
        }
    }
}

fn collect_items(state: &mut GameState) {
    let player_box = state.player.hitbox();
    let mut collected = Vec::new();
    for item in state.level.items.iter_mut().filter(|i| i.alive) {
        item.tick();
        if !state.player.dead && item.hitbox().intersects(&player_box) {
            item.alive = false;
            collected.push((item.kind, item.display_pos()));
        }
    }
    for (kind, at) in collected {
        state.player.collect(kind);
        state
            .feel
            .spawn_particles(at, Rgb::GREEN, ParticleBurst::new(10, 3.0, 22, 4.0));
        state.emit(GameEvent::ItemCollected(kind));
    }
}
