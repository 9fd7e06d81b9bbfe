use glam::Vec2;

use crate::math::Rect;

/// Opaque identity of the game object that owns a body.
///
/// The engine never touches the owner itself; callbacks and query results
/// echo this id so the caller can route back to its own entity (pack your
/// entity id, slotmap key, whatever).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub u64);

/// Per-edge flag set, used for contact state and collision gating.
///
/// Coordinates are y-down, so `up` is the top edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeFlags {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl EdgeFlags {
    pub const NONE: EdgeFlags = EdgeFlags {
        left: false,
        right: false,
        up: false,
        down: false,
    };

    pub const ALL: EdgeFlags = EdgeFlags {
        left: true,
        right: true,
        up: true,
        down: true,
    };

    pub fn any(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

/// The mutable physical state attached to one game object.
///
/// `position` is the top-left corner of the box (screen-space convention,
/// y-down). Bounds are derived from `position` + `size` and refreshed by
/// integration and by every positional correction.
#[derive(Clone, Debug)]
pub struct Body {
    pub owner: OwnerId,

    /// Disabled bodies are skipped by integration and every collision path.
    pub enable: bool,

    pub position: Vec2,
    /// Position at the start of the current step; collision checks use the
    /// per-step delta to tell which way the body is actually moving.
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Per-body gravity, added on top of world gravity.
    pub gravity: Vec2,
    pub allow_gravity: bool,
    /// Linear deceleration applied on an axis with no acceleration.
    pub drag: Vec2,
    pub allow_drag: bool,
    pub max_velocity: Vec2,
    /// Restitution per axis, consumed by separation and tile response.
    pub bounce: Vec2,

    pub size: Vec2,
    pub mass: f32,
    /// An immovable body is never displaced by separation.
    pub immovable: bool,
    /// A pushable body trades velocity with whatever it hits; a non-pushable
    /// one simply stops. Position can still be corrected either way.
    pub pushable: bool,

    /// Clamp against the world rect during integration.
    pub collide_world_bounds: bool,
    /// Which of this body's edges participate in tile collision.
    pub check_collision: EdgeFlags,

    /// Contact state written by the separators this step. Last write wins
    /// when several pairs touch the same body in one tick.
    pub touching: EdgeFlags,
    pub was_touching: EdgeFlags,
    /// Edges pinned by a tile or the world bounds this step.
    pub blocked: EdgeFlags,

    bounds: Rect,
}

impl Body {
    pub fn new(owner: OwnerId, position: Vec2, size: Vec2) -> Self {
        let mut body = Self {
            owner,
            enable: true,
            position,
            previous_position: position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: Vec2::ZERO,
            allow_gravity: true,
            drag: Vec2::ZERO,
            allow_drag: true,
            max_velocity: Vec2::splat(10_000.0),
            bounce: Vec2::ZERO,
            size,
            mass: 1.0,
            immovable: false,
            pushable: true,
            collide_world_bounds: false,
            check_collision: EdgeFlags::ALL,
            touching: EdgeFlags::NONE,
            was_touching: EdgeFlags::NONE,
            blocked: EdgeFlags::NONE,
            bounds: Rect::default(),
        };
        body.sync_bounds();
        body
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Movement accumulated this step.
    pub fn delta(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Standing on something this step.
    pub fn on_floor(&self) -> bool {
        self.blocked.down || self.touching.down
    }

    pub fn on_wall(&self) -> bool {
        self.blocked.left || self.blocked.right || self.touching.left || self.touching.right
    }

    /// Zero out all motion.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    pub(crate) fn sync_bounds(&mut self) {
        self.bounds = Rect::new(
            self.position.x,
            self.position.y,
            self.size.x.max(0.0),
            self.size.y.max(0.0),
        );
    }

    /// Rotate contact flags at the start of a step. `World::step` calls this
    /// for every enabled body; call it yourself when driving bodies without
    /// a world.
    pub fn reset_step_flags(&mut self) {
        self.was_touching = self.touching;
        self.touching = EdgeFlags::NONE;
        self.blocked = EdgeFlags::NONE;
        self.previous_position = self.position;
    }

    /// Advance velocity and position by `dt` seconds.
    ///
    /// Per axis: gravity, then acceleration; an axis with no acceleration
    /// decelerates linearly through `drag`, stopping at zero rather than
    /// crossing it. The result is clamped to `max_velocity` before the
    /// position update.
    pub fn integrate(&mut self, world_gravity: Vec2, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let mut v = self.velocity;

        if self.allow_gravity {
            v += (world_gravity + self.gravity) * dt;
        }

        v.x = integrate_axis(v.x, self.acceleration.x, self.drag.x, self.allow_drag, dt);
        v.y = integrate_axis(v.y, self.acceleration.y, self.drag.y, self.allow_drag, dt);

        v = v.clamp(-self.max_velocity, self.max_velocity);

        self.velocity = v;
        self.position += v * dt;
        self.sync_bounds();
    }
}

fn integrate_axis(velocity: f32, acceleration: f32, drag: f32, allow_drag: bool, dt: f32) -> f32 {
    if acceleration != 0.0 {
        velocity + acceleration * dt
    } else if allow_drag && drag != 0.0 {
        let drag = drag * dt;
        if velocity - drag > 0.0 {
            velocity - drag
        } else if velocity + drag < 0.0 {
            velocity + drag
        } else {
            0.0
        }
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn body() -> Body {
        Body::new(OwnerId(1), Vec2::ZERO, Vec2::splat(10.0))
    }

    #[test]
    fn integrate_applies_gravity_and_moves() {
        let mut b = body();
        b.integrate(Vec2::new(0.0, 100.0), 0.5);
        assert_relative_eq!(b.velocity.y, 50.0);
        assert_relative_eq!(b.position.y, 25.0);
        assert_relative_eq!(b.bounds().top(), 25.0);
    }

    #[test]
    fn integrate_zero_dt_is_noop() {
        let mut b = body();
        b.velocity = Vec2::new(5.0, 5.0);
        b.integrate(Vec2::new(0.0, 100.0), 0.0);
        assert_eq!(b.position, Vec2::ZERO);
        assert_eq!(b.velocity, Vec2::new(5.0, 5.0));
        b.integrate(Vec2::new(0.0, 100.0), -1.0);
        assert_eq!(b.position, Vec2::ZERO);
    }

    #[test]
    fn drag_stops_at_zero_without_sign_flip() {
        let mut b = body();
        b.allow_gravity = false;
        b.velocity.x = 10.0;
        b.drag.x = 8.0;
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, 2.0);
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, 0.0);
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, 0.0);
    }

    #[test]
    fn acceleration_overrides_drag() {
        let mut b = body();
        b.allow_gravity = false;
        b.acceleration.x = 10.0;
        b.drag.x = 100.0;
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, 10.0);
    }

    #[test]
    fn velocity_clamped_to_max() {
        let mut b = body();
        b.allow_gravity = false;
        b.max_velocity = Vec2::new(3.0, 3.0);
        b.acceleration.x = 100.0;
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, 3.0);
        b.velocity = Vec2::ZERO;
        b.acceleration.x = -100.0;
        b.integrate(Vec2::ZERO, 1.0);
        assert_relative_eq!(b.velocity.x, -3.0);
    }

    #[test]
    fn step_flags_rotate() {
        let mut b = body();
        b.touching.down = true;
        b.blocked.down = true;
        b.reset_step_flags();
        assert!(b.was_touching.down);
        assert!(!b.touching.any());
        assert!(!b.blocked.any());
        assert_eq!(b.previous_position, b.position);
    }

    #[test]
    fn delta_tracks_position_change() {
        let mut b = body();
        b.reset_step_flags();
        b.position.x += 4.0;
        b.position.y -= 2.0;
        assert_eq!(b.delta(), Vec2::new(4.0, -2.0));
    }
}
