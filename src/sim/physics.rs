//! Entity physics: semi-implicit Euler integration and tile collision
//!
//! Resolution is axis-separated: the body first moves along X and is pushed
//! out of any tile it overlaps, then moves along Y and is pushed out again.
//! Landing sets `on_ground`; any blocked axis loses its velocity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::{GRAVITY, TERMINAL_VELOCITY};

/// Position, velocity and extent of a moving entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Add one tick of gravity, clamped to terminal velocity
    pub fn apply_gravity(&mut self) {
        self.vel.y = (self.vel.y + GRAVITY).min(TERMINAL_VELOCITY);
    }
}

/// Static geometry a body collides with: level tiles plus optional extra
/// blockers (closed ability gates).
#[derive(Debug, Clone, Copy)]
pub struct Solids<'a> {
    tiles: &'a [Rect],
    extra: &'a [Rect],
}

impl<'a> Solids<'a> {
    pub fn new(tiles: &'a [Rect]) -> Self {
        Self { tiles, extra: &[] }
    }

    pub fn with_extra(self, extra: &'a [Rect]) -> Self {
        Self { extra, ..self }
    }

    pub fn iter(self) -> impl Iterator<Item = &'a Rect> {
        self.tiles.iter().chain(self.extra.iter())
    }
}

/// What a body touched while resolving one move
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contacts {
    /// Direction (+1 right, -1 left) of the wall that stopped horizontal motion
    pub wall: Option<f32>,
    pub landed: bool,
    pub ceiling: bool,
}

/// Integrate velocity into position and resolve overlaps against `solids`
pub fn move_and_collide(body: &mut Body, solids: Solids<'_>) -> Contacts {
    let mut contacts = Contacts::default();

    // X axis
    body.pos.x += body.vel.x;
    for tile in solids.iter() {
        let rect = body.rect();
        if !rect.intersects(tile) {
            continue;
        }
        let push_left = if body.vel.x > 0.0 {
            true
        } else if body.vel.x < 0.0 {
            false
        } else {
            rect.right() - tile.left() < tile.right() - rect.left()
        };
        if push_left {
            body.pos.x = tile.left() - body.size.x;
            contacts.wall = Some(1.0);
        } else {
            body.pos.x = tile.right();
            contacts.wall = Some(-1.0);
        }
        body.vel.x = 0.0;
    }

    // Y axis
    body.pos.y += body.vel.y;
    body.on_ground = false;
    for tile in solids.iter() {
        let rect = body.rect();
        if !rect.intersects(tile) {
            continue;
        }
        let push_up = if body.vel.y > 0.0 {
            true
        } else if body.vel.y < 0.0 {
            false
        } else {
            rect.bottom() - tile.top() < tile.bottom() - rect.top()
        };
        if push_up {
            body.pos.y = tile.top() - body.size.y;
            body.on_ground = true;
            contacts.landed = true;
        } else {
            body.pos.y = tile.bottom();
            contacts.ceiling = true;
        }
        body.vel.y = 0.0;
    }

    depenetrate(body, solids);
    contacts
}

/// Last-resort cleanup when pushing out of one tile shoved the body into
/// another: move along the axis of least penetration until clear.
fn depenetrate(body: &mut Body, solids: Solids<'_>) {
    for _ in 0..4 {
        let mut moved = false;
        for tile in solids.iter() {
            let rect = body.rect();
            if !rect.intersects(tile) {
                continue;
            }
            let push_x = if rect.center().x < tile.center().x {
                tile.left() - rect.right()
            } else {
                tile.right() - rect.left()
            };
            let push_y = if rect.center().y < tile.center().y {
                tile.top() - rect.bottom()
            } else {
                tile.bottom() - rect.top()
            };
            if push_x.abs() < push_y.abs() {
                body.pos.x += push_x;
                body.vel.x = 0.0;
            } else {
                body.pos.y += push_y;
                body.vel.y = 0.0;
                if push_y < 0.0 {
                    body.on_ground = true;
                }
            }
            moved = true;
        }
        if !moved {
            break;
        }
    }
}

/// Narrow sensor for a wall within `reach` of either side of the body.
///
/// Returns the wall direction (+1 right, -1 left). Tiles the body already
/// overlaps or that do not share vertical extent are ignored.
pub fn wall_contact(body: &Body, solids: Solids<'_>, reach: f32) -> Option<f32> {
    let rect = body.rect();
    let mut side = None;
    for tile in solids.iter() {
        if rect.intersects(tile) || !rect.overlaps_vertically(tile) {
            continue;
        }
        let gap_right = tile.left() - rect.right();
        if (0.0..reach).contains(&gap_right) {
            side = Some(1.0);
        }
        let gap_left = rect.left() - tile.right();
        if (0.0..reach).contains(&gap_left) {
            side = Some(-1.0);
        }
    }
    side
}

/// True if there is floor just past the leading foot in the `facing` direction
pub fn floor_ahead(body: &Body, facing: f32, solids: Solids<'_>) -> bool {
    let rect = body.rect();
    let x = if facing > 0.0 {
        rect.right() + 1.0
    } else {
        rect.left() - 1.0
    };
    let foot = Vec2::new(x, rect.bottom() + 2.0);
    solids.iter().any(|t| t.contains_point(foot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn floor() -> Vec<Rect> {
        vec![Rect::new(0.0, 100.0, 400.0, 50.0)]
    }

    #[test]
    fn test_landing_sets_on_ground() {
        let tiles = floor();
        let mut body = Body::new(Vec2::new(10.0, 40.0), Vec2::new(30.0, 52.0));
        body.vel.y = 12.0;
        let contacts = move_and_collide(&mut body, Solids::new(&tiles));
        assert!(contacts.landed);
        assert!(body.on_ground);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.rect().bottom(), 100.0);
    }

    #[test]
    fn test_ceiling_zeroes_upward_velocity() {
        let tiles = vec![Rect::new(0.0, 0.0, 400.0, 20.0)];
        let mut body = Body::new(Vec2::new(10.0, 25.0), Vec2::new(30.0, 52.0));
        body.vel.y = -10.0;
        let contacts = move_and_collide(&mut body, Solids::new(&tiles));
        assert!(contacts.ceiling);
        assert_eq!(body.pos.y, 20.0);
        assert_eq!(body.vel.y, 0.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let tiles = vec![Rect::new(100.0, 0.0, 20.0, 200.0)];
        let mut body = Body::new(Vec2::new(65.0, 50.0), Vec2::new(30.0, 52.0));
        body.vel.x = 10.0;
        let contacts = move_and_collide(&mut body, Solids::new(&tiles));
        assert_eq!(contacts.wall, Some(1.0));
        assert_eq!(body.pos.x, 70.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_gravity_clamped_to_terminal_velocity() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        body.vel.y = TERMINAL_VELOCITY - 0.1;
        body.apply_gravity();
        assert_eq!(body.vel.y, TERMINAL_VELOCITY);
    }

    #[test]
    fn test_extra_solids_block() {
        let tiles: Vec<Rect> = Vec::new();
        let gate = [Rect::new(100.0, 0.0, 20.0, 200.0)];
        let mut body = Body::new(Vec2::new(65.0, 50.0), Vec2::new(30.0, 52.0));
        body.vel.x = 10.0;
        move_and_collide(&mut body, Solids::new(&tiles).with_extra(&gate));
        assert_eq!(body.pos.x, 70.0);
    }

    #[test]
    fn test_wall_sensor_detects_near_wall() {
        let tiles = vec![Rect::new(100.0, 0.0, 20.0, 200.0)];
        let near = Body::new(Vec2::new(65.0, 50.0), Vec2::new(30.0, 52.0));
        assert_eq!(wall_contact(&near, Solids::new(&tiles), 8.0), Some(1.0));
        let far = Body::new(Vec2::new(40.0, 50.0), Vec2::new(30.0, 52.0));
        assert_eq!(wall_contact(&far, Solids::new(&tiles), 8.0), None);
        let left = Body::new(Vec2::new(124.0, 50.0), Vec2::new(30.0, 52.0));
        assert_eq!(wall_contact(&left, Solids::new(&tiles), 8.0), Some(-1.0));
    }

    #[test]
    fn test_floor_ahead_detects_ledge() {
        let tiles = floor();
        let mut body = Body::new(Vec2::new(200.0, 48.0), Vec2::new(26.0, 52.0));
        assert!(floor_ahead(&body, 1.0, Solids::new(&tiles)));
        body.pos.x = 374.0;
        assert!(!floor_ahead(&body, 1.0, Solids::new(&tiles)));
        assert!(floor_ahead(&body, -1.0, Solids::new(&tiles)));
    }

    proptest! {
        #[test]
        fn prop_never_ends_overlapping(
            angle in 0.0f32..std::f32::consts::TAU,
            dist in 40.0f32..120.0,
            speed in 0.5f32..18.0,
        ) {
            let tile = Rect::new(200.0, 200.0, 80.0, 60.0);
            let tiles = vec![tile];
            let dir = Vec2::new(angle.cos(), angle.sin());
            let size = Vec2::new(30.0, 52.0);
            let start = tile.center() + dir * (dist + 60.0) - size / 2.0;
            let mut body = Body::new(start, size);
            prop_assume!(!body.rect().intersects(&tile));
            body.vel = -dir * speed;
            for _ in 0..40 {
                move_and_collide(&mut body, Solids::new(&tiles));
                prop_assert!(!body.rect().intersects(&tile));
                body.vel = -dir * speed;
            }
        }
    }
}
