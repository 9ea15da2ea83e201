//! Neon Runner - simulation core for a 2D side-scrolling action game
//!
//! Core modules:
//! - `sim`: Deterministic fixed-tick simulation (physics, combat, AI, levels, game state)
//! - `data`: Level files and the enemy stats table
//! - `settings`: Runtime configuration

pub mod data;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
///
/// Units are world pixels and simulation ticks (60 per second).
pub mod consts {
    /// Fixed simulation rate
    pub const TICK_RATE: u32 = 60;
    /// Seconds per tick
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;

    // === World ===
    /// Downward acceleration added every tick
    pub const GRAVITY: f32 = 0.58;
    /// Maximum falling speed
    pub const TERMINAL_VELOCITY: f32 = 18.0;
    /// Falling below this Y kills the player
    pub const FALL_DEATH_Y: f32 = 2000.0;
    /// Spatial grid cell size for projectile lookups
    pub const TILE_CELL: f32 = 128.0;
    /// Projectiles further than this left of the world expire
    pub const BULLET_MIN_X: f32 = -50.0;
    /// Projectiles above this Y expire
    pub const BULLET_MIN_Y: f32 = -300.0;
    /// Slack past the right world edge before a projectile expires
    pub const BULLET_EDGE_SLACK: f32 = 50.0;

    // === Player body and movement ===
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 52.0;
    pub const RUN_SPEED: f32 = 5.6;
    pub const RUN_ACCEL: f32 = 0.22;
    pub const RUN_DECEL: f32 = 0.18;
    pub const JUMP_VELOCITY: f32 = -14.2;
    pub const WALL_JUMP_VELOCITY: f32 = -13.0;
    pub const WALL_JUMP_KICK: f32 = 10.0;
    /// Max gap between the player and a wall that still counts as contact
    pub const WALL_PROBE_REACH: f32 = 8.0;
    pub const DASH_SPEED: f32 = 14.0;
    pub const DASH_TICKS: u32 = 12;
    pub const DASH_COOLDOWN: u32 = 45;

    // === Player stats ===
    pub const PLAYER_BASE_HP: i32 = 150;
    pub const PLAYER_BASE_AMMO: u32 = 30;
    pub const XP_BASE_THRESHOLD: u32 = 100;
    pub const XP_GROWTH: f32 = 1.6;
    pub const LEVEL_UP_MAX_HP: i32 = 25;
    pub const LEVEL_UP_HEAL: i32 = 40;
    pub const LEVEL_UP_AMMO: u32 = 5;

    // === Player timers (ticks) ===
    pub const HURT_TICKS: u32 = 20;
    pub const INVULN_TICKS: u32 = 50;
    pub const RESPAWN_INVULN_TICKS: u32 = 90;
    pub const LEVEL_UP_BANNER_TICKS: u32 = 130;
    pub const LANDING_TICKS: u32 = 14;

    // === Melee ===
    pub const SLASH_COOLDOWN: u32 = 20;
    pub const SLASH_LIFETIME: u32 = 16;
    pub const SLASH_WIDTH: f32 = 68.0;
    pub const SLASH_HEIGHT: f32 = 52.0;
    /// Horizontal offset of the slash box centre from the player centre
    pub const SLASH_REACH: f32 = 34.0;
    pub const SLASH_BASE_DAMAGE: i32 = 50;
    pub const SLASH_DAMAGE_PER_LEVEL: i32 = 8;
    pub const COMBO_WINDOW: u32 = 35;
    pub const COMBO_FINISHER_MULT: f32 = 1.7;

    // === Ranged ===
    pub const SHOOT_COOLDOWN: u32 = 14;
    pub const BULLET_SPEED: f32 = 14.0;
    pub const BULLET_BASE_DAMAGE: i32 = 22;
    pub const BULLET_DAMAGE_PER_LEVEL: i32 = 4;

    // === Neural discharge ===
    pub const NEURAL_DURATION: u32 = 200;
    pub const NEURAL_COOLDOWN: u32 = 600;
    /// Enemy speed multiplier while slowed
    pub const SLOW_FACTOR: f32 = 0.35;

    // === Enemies ===
    pub const AGGRO_RADIUS: f32 = 380.0;
    pub const WINDUP_TICKS: u32 = 22;
    pub const PATROL_TICKS: u32 = 160;
    pub const PATROL_SPEED_FACTOR: f32 = 0.45;
    pub const ENEMY_DRAG: f32 = 0.86;
    pub const APPROACH_BRAKE: f32 = 0.7;
    pub const BOUNCE_DAMPING: f32 = 0.3;
    pub const ENEMY_HURT_TICKS: u32 = 14;
    pub const DRONE_BULLET_SPEED: f32 = 8.0;
    pub const DRONE_STEER: f32 = 0.07;
    pub const DRONE_IDLE_DRAG: f32 = 0.9;
    pub const DRONE_BOB_AMPLITUDE: f32 = 0.45;
    /// Bob phase advance per tick (radians)
    pub const DRONE_BOB_RATE: f32 = 0.0333;
    pub const BOSS_PHASE_TWO_RATIO: f32 = 0.5;
    pub const BOSS_VOLLEY_DAMAGE: i32 = 18;
    pub const BOSS_VOLLEY_SPEED: f32 = 9.0;
    pub const BOSS_VOLLEY_INTERVAL: u32 = 42;
    /// X offset of the second aim point in a boss volley
    pub const BOSS_VOLLEY_SPREAD: f32 = 60.0;

    // === Items ===
    pub const PICKUP_SIZE: f32 = 24.0;
    pub const HEALTH_RESTORE: i32 = 45;
    pub const AMMO_RESTORE: u32 = 12;
    pub const DROP_CHANCE: f64 = 0.36;
    pub const ITEM_BOB_RATE: f32 = 0.07;
    pub const ITEM_BOB_AMPLITUDE: f32 = 5.0;

    // === Level layout ===
    /// Default top of the ground slabs
    pub const GROUND_Y: f32 = 610.0;
    /// Ground slabs extend this far below their top edge
    pub const GROUND_DEPTH: f32 = 300.0;
    pub const BOSS_BASE_X: f32 = 4350.0;
    pub const BOSS_X_PER_ZONE: f32 = 60.0;
    /// Boss spawns this far above the ground line
    pub const BOSS_GROUND_OFFSET: f32 = 96.0;
    /// World extends this far past the boss spawn
    pub const WORLD_PAST_BOSS: f32 = 600.0;
    /// Top-left spawn used when a level has no checkpoints
    pub const DEFAULT_SPAWN: (f32, f32) = (80.0, 530.0);

    // === Level lifecycle ===
    pub const CHECKPOINT_TOLERANCE_X: f32 = 100.0;
    pub const CHECKPOINT_TOLERANCE_Y: f32 = 80.0;
    /// Distance from the right world edge that triggers a zone advance
    pub const ZONE_EXIT_MARGIN: f32 = 400.0;
    pub const FINAL_ZONE: u32 = 3;
    pub const ZONE_ADVANCE_HEAL: i32 = 55;
    pub const ZONE_BANNER_TICKS: u32 = 220;
    pub const FADE_IN_START: u32 = 255;
    pub const FADE_IN_STEP: u32 = 9;

    // === Camera and exploration ===
    pub const CAMERA_EASE: f32 = 0.10;
    pub const CAMERA_Y_OFFSET: f32 = 70.0;
    pub const CAMERA_MAX_Y: f32 = 800.0;
    pub const EXPLORE_CELL_W: f32 = 400.0;
    pub const EXPLORE_CELL_H: f32 = 300.0;

    // === Game feel ===
    pub const HITSTOP_SLASH: u32 = 4;
    pub const HITSTOP_SHOT: u32 = 2;
    pub const SHAKE_SLASH: f32 = 4.0;
    pub const SHAKE_SHOT: f32 = 2.0;
    pub const SHAKE_MELEE_HIT: f32 = 6.0;
    pub const SHAKE_DECAY: f32 = 0.85;
    pub const DAMAGE_NUMBER_TICKS: u32 = 45;
    pub const PARTICLE_GRAVITY: f32 = 0.13;
    pub const PARTICLE_DRAG: f32 = 0.93;
}

/// Linear interpolation from `a` toward `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign of a facing value: -1.0 for left, 1.0 otherwise
#[inline]
pub fn facing_sign(dx: f32) -> f32 {
    if dx >= 0.0 { 1.0 } else { -1.0 }
}
