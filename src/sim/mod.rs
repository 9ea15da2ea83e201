//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, ids never reused)
//! - No rendering, audio or platform dependencies

pub mod combat;
pub mod effects;
pub mod enemy;
pub mod grid;
pub mod item;
pub mod level;
pub mod physics;
pub mod player;
pub mod progression;
pub mod rect;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use combat::{Bullet, Collidable, DamageOutcome, Damageable, Faction, Slash};
pub use effects::{Effects, GameEvent, GameFeel, ParticleBurst, Rgb};
pub use enemy::{Archetype, ArchetypeStats, Enemy, StatsTable};
pub use grid::TileGrid;
pub use item::{Item, ItemKind};
pub use level::{Level, LevelBlueprint, LevelSource, ProceduralLevels};
pub use physics::{Body, Solids, move_and_collide};
pub use player::Player;
pub use progression::{Ability, AbilitySet, ObstacleKind, can_pass_obstacle};
pub use rect::Rect;
pub use snapshot::{AnimationCue, DrawState};
pub use state::{Camera, GameState, Phase};
pub use tick::{TickInput, tick};
