//! Crowd pressure test: many pushable bodies bouncing around a walled
//! arena through the public collide API and the quadtree broad-phase.

use glam::Vec2;
use thud::{ColliderRef, OwnerId, Rect, World, WorldConfig};

const ARENA: f32 = 640.0;
const BODIES: u64 = 120;

/// Deterministic LCG so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self, max: f32) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as f32 / (1u64 << 31) as f32) * max
    }
}

fn main() {
    env_logger::init();

    let mut world = World::new(WorldConfig {
        bounds: Rect::new(0.0, 0.0, ARENA, ARENA),
        ..WorldConfig::default()
    });

    // Four immovable walls framing the arena.
    let walls = world.create_group();
    let thickness = 16.0;
    let spans = [
        (Vec2::new(0.0, 0.0), Vec2::new(ARENA, thickness)),
        (Vec2::new(0.0, ARENA - thickness), Vec2::new(ARENA, thickness)),
        (Vec2::new(0.0, 0.0), Vec2::new(thickness, ARENA)),
        (Vec2::new(ARENA - thickness, 0.0), Vec2::new(thickness, ARENA)),
    ];
    for (i, (pos, size)) in spans.into_iter().enumerate() {
        let h = world.add_body(OwnerId(1000 + i as u64), pos, size);
        world.body_mut(h).unwrap().immovable = true;
        world.group_add(walls, h).unwrap();
    }

    let crowd = world.create_group();
    let mut rng = Lcg(0xc0ffee);
    for i in 0..BODIES {
        let pos = Vec2::new(
            40.0 + rng.next_f32(ARENA - 100.0),
            40.0 + rng.next_f32(ARENA - 100.0),
        );
        let h = world.add_body(OwnerId(i), pos, Vec2::splat(12.0));
        world.group_add(crowd, h).unwrap();
        let b = world.body_mut(h).unwrap();
        b.velocity = Vec2::new(rng.next_f32(240.0) - 120.0, rng.next_f32(240.0) - 120.0);
        b.bounce = Vec2::splat(1.0);
    }

    let dt = 1.0 / 60.0;
    for tick in 0..600u32 {
        world.step(dt);

        let mut crowd_hits = 0u32;
        world
            .collide(
                ColliderRef::Group(crowd),
                None,
                None,
                Some(&mut |_, _| crowd_hits += 1),
            )
            .expect("crowd group is live");

        let mut wall_hits = 0u32;
        world
            .collide(
                ColliderRef::Group(crowd),
                Some(ColliderRef::Group(walls)),
                None,
                Some(&mut |_, _| wall_hits += 1),
            )
            .expect("groups are live");

        if tick % 60 == 0 {
            println!(
                "t={:>4.1}s bodies={} crowd contacts={:<3} wall contacts={:<3}",
                tick as f32 * dt,
                world.body_count(),
                crowd_hits,
                wall_hits,
            );
        }
    }
}
