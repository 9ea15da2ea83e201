//! Level construction, content providers and checkpoint tracking
//!
//! A [`LevelSource`] turns a zone index into a [`LevelBlueprint`] (plain
//! placement data). [`Level::build`] instantiates the blueprint into live
//! entities and a tile grid. When a source has nothing for a zone the caller
//! falls back to [`procedural_blueprint`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::effects::Rgb;
use super::enemy::{Archetype, Enemy, StatsTable};
use super::grid::TileGrid;
use super::item::{Item, ItemKind};
use super::progression::{AbilitySet, ObstacleKind};
use super::rect::Rect;
use crate::consts::*;

/// Enemy placement; `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub pos: Vec2,
    pub archetype: Archetype,
    /// Stat scaling level (usually the zone index)
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpawn {
    pub pos: Vec2,
    pub kind: ItemKind,
}

/// Barrier that blocks the player until an ability makes it passable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gate {
    pub rect: Rect,
    pub kind: ObstacleKind,
}

impl Gate {
    pub fn blocks(&self, abilities: &AbilitySet) -> bool {
        !self.kind.passable_with(abilities)
    }
}

/// Everything needed to build one zone
#[derive(Debug, Clone, PartialEq)]
pub struct LevelBlueprint {
    pub zone: u32,
    pub tiles: Vec<Rect>,
    pub gates: Vec<Gate>,
    pub enemies: Vec<EnemySpawn>,
    pub items: Vec<ItemSpawn>,
    pub world_width: f32,
    pub background: Rgb,
    pub zone_name: String,
    /// Respawn points (player top-left), in progression order
    pub checkpoints: Vec<Vec2>,
}

/// Supplier of level content by zone index
pub trait LevelSource {
    /// `None` when the source has no usable content for `zone`
    fn blueprint(&self, zone: u32) -> Option<LevelBlueprint>;
}

/// Source that always returns the built-in layout
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralLevels;

impl LevelSource for ProceduralLevels {
    fn blueprint(&self, zone: u32) -> Option<LevelBlueprint> {
        Some(procedural_blueprint(zone))
    }
}

pub const BACKGROUNDS: [Rgb; 3] = [Rgb(4, 4, 14), Rgb(3, 3, 12), Rgb(8, 0, 18)];

pub const ZONE_NAMES: [&str; 3] = [
    "ZONE I: RUINED CITY",
    "ZONE II: ABANDONED LABS",
    "ZONE III: FINAL FORTRESS",
];

/// Pick the entry for `zone` (1-based), cycling past the end
pub fn cycle<T: Clone>(entries: &[T], zone: u32) -> Option<T> {
    if entries.is_empty() {
        return None;
    }
    let idx = zone.saturating_sub(1) as usize % entries.len();
    entries.get(idx).cloned()
}

/// Boss spawn (top-left) for `zone` on a ground line at `ground_y`
pub fn default_boss_pos(zone: u32, ground_y: f32) -> Vec2 {
    Vec2::new(
        BOSS_BASE_X + zone as f32 * BOSS_X_PER_ZONE,
        ground_y - BOSS_GROUND_OFFSET,
    )
}

/// Built-in three-zone layout; later zones add enemies on the same map
pub fn procedural_blueprint(zone: u32) -> LevelBlueprint {
    let gy = GROUND_Y;
    let ground = [
        (0.0, gy, 780.0),
        (840.0, gy - 50.0, 420.0),
        (1310.0, gy, 520.0),
        (1880.0, gy - 50.0, 430.0),
        (2360.0, gy, 640.0),
        (3050.0, gy - 50.0, 520.0),
        (3620.0, gy, 0.0),
    ];
    let plats = [
        (200.0, 490.0, 150.0),
        (400.0, 410.0, 170.0),
        (640.0, 470.0, 120.0),
        (870.0, 440.0, 190.0),
        (1070.0, 360.0, 140.0),
        (1330.0, 430.0, 160.0),
        (1510.0, 320.0, 200.0),
        (1760.0, 440.0, 155.0),
        (1870.0, 310.0, 175.0),
        (2120.0, 380.0, 155.0),
        (2360.0, 300.0, 190.0),
        (2600.0, 450.0, 125.0),
        (2810.0, 370.0, 160.0),
        (3010.0, 285.0, 200.0),
        (3200.0, 400.0, 140.0),
        (3400.0, 320.0, 180.0),
        (3610.0, 240.0, 165.0),
        (3810.0, 370.0, 140.0),
        (4000.0, 300.0, 180.0),
        (4200.0, 420.0, 160.0),
    ];
    let walls = [
        (310.0, 420.0, 190.0),
        (770.0, 310.0, 300.0),
        (1260.0, 220.0, 390.0),
        (2060.0, 350.0, 260.0),
        (2760.0, 300.0, 310.0),
        (3570.0, 220.0, 390.0),
    ];

    let boss = default_boss_pos(zone, gy);
    let world_width = boss.x + WORLD_PAST_BOSS;

    let mut tiles = Vec::with_capacity(ground.len() + plats.len() + walls.len());
    // A zero width slab runs to the world edge so the boss arena has a floor
    tiles.extend(ground.iter().map(|&(x, y, w)| {
        let w = if w > 0.0 { w } else { world_width - x };
        Rect::new(x, y, w, GROUND_DEPTH)
    }));
    tiles.extend(plats.iter().map(|&(x, y, w)| Rect::new(x, y, w, 18.0)));
    tiles.extend(walls.iter().map(|&(x, y, h)| Rect::new(x, y, 22.0, h)));

    use Archetype::*;
    // Feet on the low and raised slabs
    let low = |h: f32| gy - h;
    let raised = |h: f32| gy - 50.0 - h;
    let mut placements = vec![
        (360.0, low(42.0), Infected),
        (540.0, low(42.0), Infected),
        (880.0, raised(42.0), Infected),
        (960.0, raised(42.0), Infected),
        (1120.0, 310.0, Drone),
        (1400.0, low(42.0), Infected),
        (1620.0, 270.0, Drone),
        (1820.0, 390.0, Infected),
        (2150.0, raised(42.0), Infected),
        (2280.0, 250.0, Drone),
        (2500.0, low(64.0), Mutant),
        (2790.0, low(42.0), Infected),
        (3060.0, 235.0, Drone),
        (3250.0, raised(42.0), Infected),
        (3440.0, raised(64.0), Mutant),
        (3740.0, 190.0, Drone),
        (3930.0, 250.0, Infected),
        (4100.0, low(42.0), Infected),
        (4260.0, 250.0, Mutant),
    ];
    if zone >= 2 {
        placements.extend([
            (1750.0, 290.0, Mutant),
            (2600.0, 370.0, Drone),
            (3800.0, low(64.0), Mutant),
        ]);
    }
    if zone >= 3 {
        let escorts: Vec<_> = placements
            .iter()
            .step_by(3)
            .map(|&(x, y, _)| (x + 80.0, y, Drone))
            .collect();
        placements.extend(escorts);
    }
    placements.push((boss.x, boss.y, Boss));

    let enemies = placements
        .into_iter()
        .map(|(x, y, archetype)| EnemySpawn {
            pos: Vec2::new(x, y),
            archetype,
            level: zone,
        })
        .collect();

    let items = [
        (260.0, 468.0, ItemKind::Health),
        (700.0, 450.0, ItemKind::Ammo),
        (1100.0, 335.0, ItemKind::Health),
        (1720.0, 415.0, ItemKind::Ammo),
        (2310.0, 276.0, ItemKind::Health),
        (3060.0, 260.0, ItemKind::Ammo),
        (3830.0, 346.0, ItemKind::Health),
        (4150.0, 278.0, ItemKind::Ammo),
    ]
    .into_iter()
    .map(|(x, y, kind)| ItemSpawn {
        pos: Vec2::new(x, y),
        kind,
    })
    .collect();

    LevelBlueprint {
        zone,
        tiles,
        gates: Vec::new(),
        enemies,
        items,
        world_width,
        background: cycle(&BACKGROUNDS, zone).unwrap_or(BACKGROUNDS[0]),
        zone_name: cycle(&ZONE_NAMES, zone)
            .unwrap_or(ZONE_NAMES[0])
            .to_string(),
        checkpoints: vec![
            Vec2::new(80.0, 530.0),
            Vec2::new(1200.0, 560.0),
            Vec2::new(2500.0, 560.0),
            Vec2::new(3800.0, 560.0),
        ],
    }
}

/// How far a walker's feet may be from a surface and still snap onto it
const SPAWN_SNAP: f32 = 64.0;

/// Place a spawn so it never starts inside a tile. Walkers snap their feet
/// onto the highest surface within reach, then anything still overlapping
/// is lifted on top of the tile it overlaps.
pub fn settle_spawn(pos: Vec2, size: Vec2, flying: bool, tiles: &[Rect]) -> Vec2 {
    let mut pos = pos;
    if !flying {
        let feet = pos.y + size.y;
        let support = tiles
            .iter()
            .filter(|t| t.left() < pos.x + size.x && t.right() > pos.x)
            .map(Rect::top)
            .filter(|top| (top - feet).abs() <= SPAWN_SNAP)
            .min_by(f32::total_cmp);
        if let Some(top) = support {
            pos.y = top - size.y;
        }
    }
    for _ in 0..tiles.len() {
        let body = Rect::at(pos, size);
        let Some(top) = tiles
            .iter()
            .filter(|t| t.intersects(&body))
            .map(Rect::top)
            .min_by(f32::total_cmp)
        else {
            break;
        };
        pos.y = top - size.y;
    }
    pos
}

/// A zone instantiated for play
#[derive(Debug, Clone)]
pub struct Level {
    pub zone: u32,
    pub tiles: Vec<Rect>,
    pub gates: Vec<Gate>,
    pub grid: TileGrid,
    pub enemies: Vec<Enemy>,
    pub items: Vec<Item>,
    pub world_width: f32,
    pub background: Rgb,
    pub zone_name: String,
    /// Never empty
    pub checkpoints: Vec<Vec2>,
}

impl Level {
    /// Instantiate a blueprint. Entity ids are drawn from `next_id`.
    pub fn build(bp: LevelBlueprint, stats: &StatsTable, rng: &mut Pcg32, next_id: &mut u32) -> Self {
        let mut alloc = || {
            let id = *next_id;
            *next_id += 1;
            id
        };

        let enemies: Vec<Enemy> = bp
            .enemies
            .iter()
            .map(|s| {
                let phase = rng.random_range(0.0..std::f32::consts::TAU);
                let kind = stats.get(s.archetype);
                let size = Vec2::new(kind.width, kind.height);
                let pos = settle_spawn(s.pos, size, s.archetype.is_flying(), &bp.tiles);
                Enemy::new(alloc(), s.archetype, pos, s.level, stats, phase)
            })
            .collect();
        let items: Vec<Item> = bp
            .items
            .iter()
            .map(|s| {
                let bob = rng.random_range(0.0..std::f32::consts::TAU);
                Item::new(alloc(), s.pos, s.kind, bob)
            })
            .collect();

        let mut checkpoints = bp.checkpoints;
        if checkpoints.is_empty() {
            log::warn!("Zone {} has no checkpoints, using default spawn", bp.zone);
            checkpoints.push(Vec2::new(DEFAULT_SPAWN.0, DEFAULT_SPAWN.1));
        }

        let grid = TileGrid::build(&bp.tiles, TILE_CELL);
        log::info!(
            "Built zone {} '{}': {} tiles, {} gates, {} enemies, {} items, width {}",
            bp.zone,
            bp.zone_name,
            bp.tiles.len(),
            bp.gates.len(),
            enemies.len(),
            items.len(),
            bp.world_width
        );

        Self {
            zone: bp.zone,
            tiles: bp.tiles,
            gates: bp.gates,
            grid,
            enemies,
            items,
            world_width: bp.world_width,
            background: bp.background,
            zone_name: bp.zone_name,
            checkpoints,
        }
    }

    /// The zone boss, alive or not
    pub fn boss(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.is_boss())
    }

    pub fn boss_defeated(&self) -> bool {
        self.boss().is_some_and(|b| !b.alive)
    }

    /// Rectangles of gates the given ability set cannot pass
    pub fn blocking_gates(&self, abilities: &AbilitySet) -> Vec<Rect> {
        self.gates
            .iter()
            .filter(|g| g.blocks(abilities))
            .map(|g| g.rect)
            .collect()
    }

    /// Checkpoint position, clamped to the last one
    pub fn checkpoint(&self, index: usize) -> Vec2 {
        let idx = index.min(self.checkpoints.len().saturating_sub(1));
        self.checkpoints
            .get(idx)
            .copied()
            .unwrap_or(Vec2::new(DEFAULT_SPAWN.0, DEFAULT_SPAWN.1))
    }
}

/// Furthest checkpoint reached in the current life
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckpointProgress {
    index: usize,
}

impl CheckpointProgress {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Activate any later checkpoint whose tolerance box contains `center`.
    ///
    /// Returns the newly reached index; earlier checkpoints never regress it.
    pub fn update(&mut self, center: Vec2, checkpoints: &[Vec2]) -> Option<usize> {
        let mut reached = None;
        for (i, cp) in checkpoints.iter().enumerate() {
            let near = (center.x - cp.x).abs() < CHECKPOINT_TOLERANCE_X
                && (center.y - cp.y).abs() < CHECKPOINT_TOLERANCE_Y;
            if near && i > self.index {
                self.index = i;
                reached = Some(i);
            }
        }
        reached
    }

    /// Back to the first checkpoint (full restart only)
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::Collidable;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn build(zone: u32) -> Level {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut next_id = 1;
        Level::build(
            procedural_blueprint(zone),
            &StatsTable::default(),
            &mut rng,
            &mut next_id,
        )
    }

    #[test]
    fn test_procedural_zone_one_layout() {
        let bp = procedural_blueprint(1);
        assert_eq!(bp.tiles.len(), 33);
        assert_eq!(bp.enemies.len(), 20);
        assert_eq!(bp.items.len(), 8);
        assert_eq!(bp.checkpoints.len(), 4);
        assert_eq!(bp.world_width, 4350.0 + 60.0 + 600.0);
        assert_eq!(bp.zone_name, "ZONE I: RUINED CITY");
        let bosses = bp.enemies.iter().filter(|e| e.archetype == Archetype::Boss).count();
        assert_eq!(bosses, 1);
    }

    #[test]
    fn test_later_zones_add_enemies() {
        assert_eq!(procedural_blueprint(2).enemies.len(), 23);
        // 22 regular enemies plus a drone escort for every third of them
        assert_eq!(procedural_blueprint(3).enemies.len(), 22 + 8 + 1);
        assert_eq!(procedural_blueprint(3).zone_name, "ZONE III: FINAL FORTRESS");
        assert!(procedural_blueprint(3).enemies.iter().all(|e| e.level == 3));
    }

    #[test]
    fn test_built_enemies_never_start_inside_tiles() {
        for zone in 1..=3 {
            let level = build(zone);
            for enemy in &level.enemies {
                let body = enemy.hitbox();
                assert!(
                    level.tiles.iter().all(|t| !t.intersects(&body)),
                    "zone {zone}: {:?} {} spawned inside a tile at {:?}",
                    enemy.archetype,
                    enemy.id,
                    body
                );
            }
        }
    }

    #[test]
    fn test_walkers_spawn_above_a_floor() {
        for zone in 1..=3 {
            let level = build(zone);
            for enemy in level.enemies.iter().filter(|e| !e.archetype.is_flying()) {
                let body = enemy.hitbox();
                let supported = level.tiles.iter().any(|t| {
                    t.left() < body.right()
                        && t.right() > body.left()
                        && t.top() >= body.bottom() - 1e-3
                });
                assert!(supported, "zone {zone}: {:?} at {:?} has no floor", enemy.archetype, body);
            }
        }
    }

    #[test]
    fn test_settle_lifts_embedded_walker_onto_slab() {
        let tiles = [Rect::new(0.0, 560.0, 400.0, 300.0)];
        let size = Vec2::new(26.0, 42.0);
        let pos = settle_spawn(Vec2::new(100.0, 568.0), size, false, &tiles);
        assert_eq!(pos, Vec2::new(100.0, 518.0));

        // Deep inside the slab, beyond snapping reach
        let pos = settle_spawn(Vec2::new(100.0, 700.0), size, false, &tiles);
        assert_eq!(pos, Vec2::new(100.0, 518.0));
    }

    #[test]
    fn test_settle_leaves_clear_flyer_alone() {
        let tiles = [Rect::new(0.0, 560.0, 400.0, 300.0)];
        let size = Vec2::new(30.0, 22.0);
        let clear = Vec2::new(100.0, 520.0);
        assert_eq!(settle_spawn(clear, size, true, &tiles), clear);
        let embedded = settle_spawn(Vec2::new(100.0, 550.0), size, true, &tiles);
        assert_eq!(embedded, Vec2::new(100.0, 538.0));
    }

    #[test]
    fn test_boss_arena_has_floor_to_world_edge() {
        for zone in 1..=3 {
            let bp = procedural_blueprint(zone);
            let edge = bp.world_width;
            assert!(
                bp.tiles
                    .iter()
                    .any(|t| (t.right() - edge).abs() < 1e-3 && t.top() == GROUND_Y)
            );
        }
    }

    #[test]
    fn test_build_assigns_unique_ids() {
        let level = build(1);
        let mut ids: Vec<u32> = level.enemies.iter().map(|e| e.id).collect();
        ids.extend(level.items.iter().map(|i| i.id));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert!(!ids.contains(&0));
    }

    #[test]
    fn test_boss_defeated_tracks_boss() {
        let mut level = build(1);
        assert!(!level.boss_defeated());
        if let Some(boss) = level.enemies.iter_mut().find(|e| e.is_boss()) {
            boss.alive = false;
        }
        assert!(level.boss_defeated());
    }

    #[test]
    fn test_gates_block_until_passable() {
        let mut bp = procedural_blueprint(1);
        bp.gates.push(Gate {
            rect: Rect::new(500.0, 400.0, 20.0, 210.0),
            kind: ObstacleKind::DashRequired,
        });
        bp.gates.push(Gate {
            rect: Rect::new(900.0, 400.0, 20.0, 210.0),
            kind: ObstacleKind::from_tag("decorative"),
        });
        let mut rng = Pcg32::seed_from_u64(1);
        let level = Level::build(bp, &StatsTable::default(), &mut rng, &mut 1);
        let mut abilities = AbilitySet::default();
        assert_eq!(level.blocking_gates(&abilities).len(), 1);
        abilities.check_unlocks(3);
        assert!(level.blocking_gates(&abilities).is_empty());
    }

    #[test]
    fn test_missing_checkpoints_get_default_spawn() {
        let mut bp = procedural_blueprint(1);
        bp.checkpoints.clear();
        let mut rng = Pcg32::seed_from_u64(1);
        let level = Level::build(bp, &StatsTable::default(), &mut rng, &mut 1);
        assert_eq!(level.checkpoints.len(), 1);
        assert_eq!(level.checkpoint(5), Vec2::new(80.0, 530.0));
    }

    #[test]
    fn test_checkpoint_activation_is_monotonic() {
        let checkpoints = procedural_blueprint(1).checkpoints;
        let mut progress = CheckpointProgress::default();
        assert_eq!(progress.update(Vec2::new(1210.0, 580.0), &checkpoints), Some(1));
        assert_eq!(progress.update(Vec2::new(90.0, 540.0), &checkpoints), None);
        assert_eq!(progress.index(), 1);
        progress.reset();
        assert_eq!(progress.index(), 0);
    }

    proptest! {
        #[test]
        fn prop_checkpoint_never_regresses(
            path in proptest::collection::vec((0.0f32..4500.0, 400.0f32..700.0), 1..60)
        ) {
            let checkpoints = procedural_blueprint(1).checkpoints;
            let mut progress = CheckpointProgress::default();
            let mut last = 0;
            for (x, y) in path {
                progress.update(Vec2::new(x, y), &checkpoints);
                prop_assert!(progress.index() >= last);
                last = progress.index();
            }
        }
    }
}
