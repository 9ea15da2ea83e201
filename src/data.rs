//! External content: JSON level files and the enemy stats table
//!
//! Loading is fallible and returns [`DataError`]; the simulation never sees
//! those errors. Callers that own a fallback (procedural levels, compiled-in
//! stats) log the error and substitute.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::consts::{GROUND_DEPTH, GROUND_Y, WORLD_PAST_BOSS};
use crate::sim::effects::Rgb;
use crate::sim::enemy::{Archetype, ArchetypeStats, StatsTable};
use crate::sim::item::ItemKind;
use crate::sim::level::{
    BACKGROUNDS, EnemySpawn, Gate, ItemSpawn, LevelBlueprint, LevelSource, cycle,
    default_boss_pos,
};
use crate::sim::progression::ObstacleKind;
use crate::sim::rect::Rect;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{0} not found")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// === Level files ===

fn default_ground_y() -> f32 {
    GROUND_Y
}

fn default_ground_width() -> f32 {
    200.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroundDef {
    #[serde(default)]
    pub x: f32,
    /// Offset from the level's ground line
    #[serde(default)]
    pub y_off: f32,
    #[serde(default = "default_ground_width")]
    pub w: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RectDef {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<RectDef> for Rect {
    fn from(r: RectDef) -> Self {
        Rect::new(r.x, r.y, r.w, r.h)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateDef {
    #[serde(flatten)]
    pub rect: RectDef,
    pub kind: String,
}

/// Entity placement with a string type tag
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnDef {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: String,
}

/// On-disk level layout (`level{N}.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct LevelFile {
    #[serde(default = "default_ground_y")]
    pub ground_y: f32,
    #[serde(default)]
    pub ground: Vec<GroundDef>,
    #[serde(default)]
    pub plats: Vec<RectDef>,
    #[serde(default)]
    pub walls: Vec<RectDef>,
    #[serde(default)]
    pub gates: Vec<GateDef>,
    #[serde(default)]
    pub enemies: Vec<SpawnDef>,
    pub boss_x: Option<f32>,
    pub boss_y: Option<f32>,
    #[serde(default)]
    pub items: Vec<SpawnDef>,
    pub world_w: Option<f32>,
    #[serde(default)]
    pub bg_colors: Vec<Rgb>,
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub checkpoints: Vec<(f32, f32)>,
    /// Enemy stat level; defaults to the zone index
    pub level_num: Option<u32>,
}

impl LevelFile {
    /// Resolve defaults and tags into a blueprint for `zone`.
    ///
    /// Unknown enemy or item tags are skipped. A boss is appended when the
    /// file places none.
    pub fn into_blueprint(self, zone: u32) -> LevelBlueprint {
        let gy = self.ground_y;
        let enemy_level = self.level_num.unwrap_or(zone);

        let mut tiles = Vec::new();
        tiles.extend(
            self.ground
                .iter()
                .map(|g| Rect::new(g.x, gy + g.y_off, g.w, GROUND_DEPTH)),
        );
        tiles.extend(self.plats.iter().copied().map(Rect::from));
        tiles.extend(self.walls.iter().copied().map(Rect::from));

        let gates = self
            .gates
            .iter()
            .map(|g| Gate {
                rect: g.rect.into(),
                kind: ObstacleKind::from_tag(&g.kind),
            })
            .collect();

        let mut enemies: Vec<EnemySpawn> = self
            .enemies
            .iter()
            .filter_map(|e| match Archetype::from_key(&e.kind) {
                Some(archetype) => Some(EnemySpawn {
                    pos: Vec2::new(e.x, e.y),
                    archetype,
                    level: enemy_level,
                }),
                None => {
                    log::warn!("Zone {zone}: skipping enemy with unknown type '{}'", e.kind);
                    None
                }
            })
            .collect();

        let fallback_boss = default_boss_pos(zone, gy);
        let boss_pos = Vec2::new(
            self.boss_x.unwrap_or(fallback_boss.x),
            self.boss_y.unwrap_or(fallback_boss.y),
        );
        if !enemies.iter().any(|e| e.archetype == Archetype::Boss) {
            enemies.push(EnemySpawn {
                pos: boss_pos,
                archetype: Archetype::Boss,
                level: enemy_level,
            });
        }

        let items = self
            .items
            .iter()
            .filter_map(|i| match ItemKind::from_key(&i.kind) {
                Some(kind) => Some(ItemSpawn {
                    pos: Vec2::new(i.x, i.y),
                    kind,
                }),
                None => {
                    log::warn!("Zone {zone}: skipping item with unknown type '{}'", i.kind);
                    None
                }
            })
            .collect();

        LevelBlueprint {
            zone,
            tiles,
            gates,
            enemies,
            items,
            world_width: self.world_w.unwrap_or(boss_pos.x + WORLD_PAST_BOSS),
            background: cycle(&self.bg_colors, zone)
                .or_else(|| cycle(&BACKGROUNDS, zone))
                .unwrap_or(BACKGROUNDS[0]),
            zone_name: cycle(&self.zones, zone).unwrap_or_else(|| format!("ZONE {zone}")),
            checkpoints: self
                .checkpoints
                .iter()
                .map(|&(x, y)| Vec2::new(x, y))
                .collect(),
        }
    }
}

/// Parse a level file body
pub fn parse_level(json: &str, zone: u32) -> Result<LevelBlueprint, serde_json::Error> {
    let file: LevelFile = serde_json::from_str(json)?;
    Ok(file.into_blueprint(zone))
}

/// Levels read from `level{N}.json` files in a directory
#[derive(Debug, Clone)]
pub struct JsonLevelDir {
    dir: PathBuf,
}

impl JsonLevelDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, zone: u32) -> PathBuf {
        self.dir.join(format!("level{zone}.json"))
    }

    pub fn load(&self, zone: u32) -> Result<LevelBlueprint, DataError> {
        let file: LevelFile = read_json(&self.path_for(zone))?;
        Ok(file.into_blueprint(zone))
    }
}

impl LevelSource for JsonLevelDir {
    fn blueprint(&self, zone: u32) -> Option<LevelBlueprint> {
        match self.load(zone) {
            Ok(bp) => {
                log::info!("Loaded zone {zone} from {}", self.path_for(zone).display());
                Some(bp)
            }
            Err(DataError::NotFound(path)) => {
                log::debug!("No level file at {}", path.display());
                None
            }
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }
}

// === Enemy stats ===

/// Partial per-archetype stats as found in `enemy_stats.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsOverride {
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub base_hp: Option<i32>,
    pub hp_per_level: Option<i32>,
    pub speed_base: Option<f32>,
    pub speed_per_level: Option<f32>,
    pub xp_base: Option<u32>,
    pub xp_per_level: Option<u32>,
    pub color: Option<Rgb>,
    pub at_r: Option<f32>,
    pub dmg_base: Option<i32>,
    pub dmg_per_level: Option<i32>,
    pub at_cd: Option<u32>,
}

impl StatsOverride {
    /// Overlay the present fields onto `base`
    pub fn apply(&self, base: ArchetypeStats) -> ArchetypeStats {
        ArchetypeStats {
            width: self.w.unwrap_or(base.width),
            height: self.h.unwrap_or(base.height),
            base_hp: self.base_hp.unwrap_or(base.base_hp),
            hp_per_level: self.hp_per_level.unwrap_or(base.hp_per_level),
            base_speed: self.speed_base.unwrap_or(base.base_speed),
            speed_per_level: self.speed_per_level.unwrap_or(base.speed_per_level),
            base_xp: self.xp_base.unwrap_or(base.base_xp),
            xp_per_level: self.xp_per_level.unwrap_or(base.xp_per_level),
            color: self.color.unwrap_or(base.color),
            attack_radius: self.at_r.unwrap_or(base.attack_radius),
            base_damage: self.dmg_base.unwrap_or(base.base_damage),
            damage_per_level: self.dmg_per_level.unwrap_or(base.damage_per_level),
            attack_cooldown: self.at_cd.unwrap_or(base.attack_cooldown),
        }
    }
}

/// Build a table from raw overrides keyed by archetype key
pub fn stats_from_overrides(overrides: &HashMap<String, StatsOverride>) -> StatsTable {
    let mut table = StatsTable::default();
    for (key, o) in overrides {
        match Archetype::from_key(key) {
            Some(archetype) => table.set(archetype, o.apply(*table.get(archetype))),
            None => log::warn!("Ignoring stats for unknown archetype '{key}'"),
        }
    }
    table
}

pub fn parse_stats(json: &str) -> Result<StatsTable, serde_json::Error> {
    let overrides: HashMap<String, StatsOverride> = serde_json::from_str(json)?;
    Ok(stats_from_overrides(&overrides))
}

pub fn load_stats(path: &Path) -> Result<StatsTable, DataError> {
    let overrides: HashMap<String, StatsOverride> = read_json(path)?;
    Ok(stats_from_overrides(&overrides))
}

/// Stats table from `path`, or the compiled-in table on any failure
pub fn load_stats_or_default(path: &Path) -> StatsTable {
    match load_stats(path) {
        Ok(table) => {
            log::info!("Loaded enemy stats from {}", path.display());
            table
        }
        Err(DataError::NotFound(_)) => {
            log::info!("No enemy stats at {}, using built-in table", path.display());
            StatsTable::default()
        }
        Err(e) => {
            log::warn!("{e}; using built-in enemy stats");
            StatsTable::default()
        }
    }
}
