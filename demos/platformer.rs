//! Tile-grid platformer: gravity, jumping, slopes, and on-floor checks.
//!
//! The level owns the tile grid and hands the world candidate tiles for the
//! player's bounds each tick, tagged with their offset from the player's
//! home cell.

use glam::Vec2;
use thud::{OwnerId, Tile, TileShape, World, WorldConfig};

const TILE: f32 = 32.0;

/// Minimal tilemap layer: '#' full block, '/' floor slope rising right,
/// '\\' floor slope rising left, '.' empty.
struct Level {
    rows: Vec<&'static str>,
}

impl Level {
    fn tile_at(&self, cx: i32, cy: i32) -> Option<TileShape> {
        let row = self.rows.get(cy as usize)?;
        match row.as_bytes().get(cx as usize)? {
            b'#' => Some(TileShape::Full),
            b'/' => Some(TileShape::Slope45),
            b'\\' => Some(TileShape::Slope45),
            _ => None,
        }
    }

    fn sign_at(&self, cx: i32, cy: i32) -> Vec2 {
        match self.rows[cy as usize].as_bytes()[cx as usize] {
            // Rising right: normal points up-left.
            b'/' => Vec2::new(-1.0, -1.0),
            // Rising left: normal points up-right.
            b'\\' => Vec2::new(1.0, -1.0),
            _ => Vec2::ZERO,
        }
    }

    /// Candidate tiles for the given bounds, offsets relative to `home`.
    fn tiles_in_bounds(&self, min: Vec2, max: Vec2, home: (i32, i32)) -> Vec<Tile> {
        let cx0 = (min.x / TILE).floor() as i32;
        let cy0 = (min.y / TILE).floor() as i32;
        let cx1 = (max.x / TILE).floor() as i32;
        let cy1 = (max.y / TILE).floor() as i32;

        let mut out = Vec::new();
        for cy in cy0..=cy1 {
            for cx in cx0..=cx1 {
                let Some(shape) = self.tile_at(cx, cy) else {
                    continue;
                };
                let center = Vec2::new((cx as f32 + 0.5) * TILE, (cy as f32 + 0.5) * TILE);
                let mut tile = Tile::new((cx, cy), center, Vec2::splat(TILE * 0.5), shape);
                if shape == TileShape::Slope45 {
                    let s = self.sign_at(cx, cy);
                    tile = tile.with_sign(s.x, s.y);
                }
                out.push(tile.with_neighbor_offset(
                    (cx - home.0).clamp(-1, 1),
                    (cy - home.1).clamp(-1, 1),
                ));
            }
        }
        out
    }
}

fn main() {
    env_logger::init();

    let level = Level {
        rows: vec![
            "....................",
            "....................",
            "....................",
            "..............###...",
            "....................",
            "............/#......",
            "###########/########",
        ],
    };

    let mut world = World::new(WorldConfig {
        bounds: thud::Rect::new(0.0, 0.0, 20.0 * TILE, 7.0 * TILE),
        gravity: Vec2::new(0.0, 900.0),
        ..WorldConfig::default()
    });

    let player = world.add_body(OwnerId(1), Vec2::new(40.0, 40.0), Vec2::new(20.0, 28.0));
    {
        let b = world.body_mut(player).unwrap();
        b.max_velocity = Vec2::new(200.0, 600.0);
        b.drag.x = 400.0;
    }

    let dt = 1.0 / 60.0;
    for tick in 0..360 {
        // Hold right; jump whenever grounded.
        {
            let b = world.body_mut(player).unwrap();
            b.acceleration.x = 300.0;
            if b.on_floor() && tick % 90 == 0 {
                b.velocity.y = -450.0;
            }
        }

        world.step(dt);

        let (bounds, home) = {
            let b = world.body(player).unwrap();
            let c = b.center();
            (
                b.bounds(),
                ((c.x / TILE).floor() as i32, (c.y / TILE).floor() as i32),
            )
        };
        let tiles = level.tiles_in_bounds(
            Vec2::new(bounds.left() - TILE, bounds.top() - TILE),
            Vec2::new(bounds.right() + TILE, bounds.bottom() + TILE),
            home,
        );

        let mut slope_contact = false;
        world
            .collide_tiles(
                player,
                &tiles,
                None,
                Some(&mut |_, _, hit| slope_contact |= hit == thud::TileHit::Corner),
            )
            .expect("player handle is live");

        if tick % 30 == 0 {
            let b = world.body(player).unwrap();
            println!(
                "t={:>5.2}s pos=({:>6.1},{:>6.1}) vel=({:>7.1},{:>7.1}) floor={} slope={}",
                tick as f32 * dt,
                b.position.x,
                b.position.y,
                b.velocity.x,
                b.velocity.y,
                b.on_floor(),
                slope_contact,
            );
        }
    }
}
