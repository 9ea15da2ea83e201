//! Uniform spatial grid over static tiles
//!
//! Projectiles test only the tiles bucketed in their own cell and the 8
//! neighbours instead of the whole level. Each tile is inserted into every
//! cell its rectangle touches, so a point query never misses a tile that
//! contains the point.

use std::collections::HashMap;

use glam::Vec2;

use super::rect::Rect;

/// Tile indices bucketed by grid cell
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl TileGrid {
    /// Bucket every tile into all cells its bounding rectangle overlaps
    pub fn build(tiles: &[Rect], cell_size: f32) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, tile) in tiles.iter().enumerate() {
            let cx_min = (tile.left() / cell_size).floor() as i32;
            let cx_max = (tile.right() / cell_size).floor() as i32;
            let cy_min = (tile.top() / cell_size).floor() as i32;
            let cy_max = (tile.bottom() / cell_size).floor() as i32;
            for cx in cx_min..=cx_max {
                for cy in cy_min..=cy_max {
                    cells.entry((cx, cy)).or_default().push(idx);
                }
            }
        }
        log::debug!(
            "Tile grid: {} tiles in {} cells (cell size {})",
            tiles.len(),
            cells.len(),
            cell_size
        );
        Self { cell_size, cells }
    }

    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Write candidate tile indices around `p` into `buf` (cleared first).
    ///
    /// Candidates are deduplicated and sorted; callers still run the exact
    /// rectangle test.
    pub fn candidates_into(&self, p: Vec2, buf: &mut Vec<usize>) {
        buf.clear();
        let (cx, cy) = self.cell_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) {
                    buf.extend_from_slice(ids);
                }
            }
        }
        buf.sort_unstable();
        buf.dedup();
    }

    pub fn candidates(&self, p: Vec2) -> Vec<usize> {
        let mut buf = Vec::new();
        self.candidates_into(p, &mut buf);
        buf
    }

    /// First tile (lowest index) containing `p`, if any
    pub fn tile_at(&self, tiles: &[Rect], p: Vec2) -> Option<usize> {
        let (cx, cy) = self.cell_of(p);
        let mut best: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(ids) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &idx in ids {
                    if best.is_some_and(|b| b <= idx) {
                        continue;
                    }
                    if tiles.get(idx).is_some_and(|t| t.contains_point(p)) {
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_tiles() -> Vec<Rect> {
        vec![
            Rect::new(0.0, 610.0, 780.0, 300.0),
            Rect::new(200.0, 490.0, 150.0, 18.0),
            Rect::new(310.0, 420.0, 22.0, 190.0),
        ]
    }

    #[test]
    fn test_large_tile_spans_many_cells() {
        let tiles = sample_tiles();
        let grid = TileGrid::build(&tiles, 128.0);
        // Ground slab spans x cells 0..=6 and y cells 4..=7
        for cx in 0..=6 {
            for cy in 4..=7 {
                let p = Vec2::new(cx as f32 * 128.0 + 1.0, cy as f32 * 128.0 + 1.0);
                assert!(grid.candidates(p).contains(&0), "cell ({cx},{cy})");
            }
        }
    }

    #[test]
    fn test_tile_at_hits_and_misses() {
        let tiles = sample_tiles();
        let grid = TileGrid::build(&tiles, 128.0);
        assert_eq!(grid.tile_at(&tiles, Vec2::new(250.0, 495.0)), Some(1));
        assert_eq!(grid.tile_at(&tiles, Vec2::new(100.0, 700.0)), Some(0));
        assert_eq!(grid.tile_at(&tiles, Vec2::new(100.0, 100.0)), None);
        assert_eq!(grid.tile_at(&tiles, Vec2::new(5000.0, 700.0)), None);
    }

    #[test]
    fn test_candidates_are_deduplicated() {
        let tiles = sample_tiles();
        let grid = TileGrid::build(&tiles, 128.0);
        let c = grid.candidates(Vec2::new(300.0, 600.0));
        let mut sorted = c.clone();
        sorted.dedup();
        assert_eq!(c, sorted);
    }

    proptest! {
        #[test]
        fn prop_no_false_negatives(
            x in -200.0f32..1200.0,
            y in 0.0f32..1000.0,
        ) {
            let tiles = sample_tiles();
            let grid = TileGrid::build(&tiles, 128.0);
            let p = Vec2::new(x, y);
            let brute = tiles.iter().position(|t| t.contains_point(p));
            prop_assert_eq!(grid.tile_at(&tiles, p), brute);
        }
    }
}
