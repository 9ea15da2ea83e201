//! Neon Runner headless entry point
//!
//! Loads settings and level data, then drives the simulation with a scripted
//! autopilot through the same fixed-timestep accumulator a windowed frontend
//! would use. Handy for smoke-testing level files and balance changes.
//!
//! Usage: `neon-runner [seconds] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use neon_runner::Settings;
#[cfg(not(target_arch = "wasm32"))]
use neon_runner::consts::*;
#[cfg(not(target_arch = "wasm32"))]
use neon_runner::data::{JsonLevelDir, load_stats_or_default};
#[cfg(not(target_arch = "wasm32"))]
use neon_runner::sim::{DrawState, GameEvent, GameState, Phase, TickInput, tick};

/// Cap on simulation steps per rendered frame (spiral-of-death guard)
#[cfg(not(target_arch = "wasm32"))]
const MAX_SUBSTEPS: u32 = 5;
/// Frame time of the simulated display
#[cfg(not(target_arch = "wasm32"))]
const FRAME_DT: f32 = 1.0 / 50.0;

/// Scripted player: run right, hop, swing and shoot on fixed rhythms
#[cfg(not(target_arch = "wasm32"))]
struct Autopilot {
    ticks: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl Autopilot {
    fn input(&mut self, state: &GameState) -> TickInput {
        self.ticks += 1;
        let t = self.ticks;
        match state.phase {
            Phase::Title | Phase::Dead | Phase::Won => TickInput {
                confirm: t % 30 == 0,
                ..Default::default()
            },
            Phase::Paused => TickInput {
                pause: true,
                ..Default::default()
            },
            Phase::Playing => {
                let center = state.player.center();
                let aim = center + glam::Vec2::new(300.0 * state.player.facing, 0.0);
                TickInput {
                    move_x: 1.0,
                    jump: t % 40 == 0 || state.player.body.vel.x.abs() < 0.5,
                    dash: t % 90 == 0,
                    slash: t % 25 == 0,
                    shoot: t % 12 == 0,
                    discharge: t % 700 == 0,
                    reload: state.player.ammo == 0,
                    aim,
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Neon Runner (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));

    let settings = Settings::load(&settings_path);
    let stats = load_stats_or_default(&settings.stats_path());
    let levels = JsonLevelDir::new(settings.levels_dir());
    let mut state = GameState::new(&settings, Box::new(levels), stats);

    let mut pilot = Autopilot { ticks: 0 };
    let mut accumulator = 0.0_f32;
    let frames = (seconds / FRAME_DT) as u64;
    let mut kills = 0_u32;
    let mut deaths = 0_u32;

    for _ in 0..frames {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = pilot.input(&state);
            tick(&mut state, &input);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in state.drain_events() {
            match event {
                GameEvent::EnemyKilled(_) => kills += 1,
                GameEvent::PlayerDied => deaths += 1,
                GameEvent::Jumped(_) | GameEvent::Shot | GameEvent::Slashed => {}
                other => log::debug!("{other:?}"),
            }
        }
        if state.phase == Phase::Won {
            break;
        }
    }

    let draw = DrawState::capture(&state);
    log::info!(
        "Finished: zone {} ({}), level {}, score {}, kills {kills}, deaths {deaths}",
        draw.hud.zone,
        draw.hud.zone_name,
        draw.hud.level,
        draw.hud.score,
    );
    match serde_json::to_string_pretty(&draw.hud) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize HUD: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; a host page drives `tick`
}
