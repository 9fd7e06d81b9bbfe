use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;

use crate::body::{Body, EdgeFlags};
use crate::math::Rect;

/// Default anti-tunneling allowance, in world units. An axis overlap deeper
/// than the body's per-step movement plus this much cannot have been produced
/// this step and is rejected instead of resolved.
pub const OVERLAP_BIAS: f32 = 16.0;

/// Collision shape of a tile. Slopes come in low/high pairs covering the
/// shallow and steep half of the tile; `Convex`/`Concave` are quarter-circle
/// corner pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileShape {
    Full,
    /// Half-thickness tile flush against one edge.
    Half,
    Slope45,
    Slope22Low,
    Slope22High,
    Slope67Low,
    Slope67High,
    Convex,
    Concave,
}

/// Outcome of resolving a body against one tile.
///
/// `Face` is a flat-face (axis) resolution, `Corner` a vertex or slope
/// resolution. "On floor" style checks care about the difference: a `Face`
/// hit from below is solid ground, a `Corner` graze is not.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TileHit {
    None,
    Face,
    Corner,
}

impl TileHit {
    pub fn is_contact(&self) -> bool {
        !matches!(self, TileHit::None)
    }
}

/// One collidable grid cell, described in world space.
///
/// Immutable once placed, apart from enabling/disabling edges through
/// `collide`. `sign` gives the facing of shaped tiles: which quadrant the
/// solid part occupies, components in {-1, 0, 1}. `Full` tiles ignore it.
///
/// `oh`/`ov` locate the tile relative to the colliding body's home cell
/// (tile one cell to the right: `oh = 1`). Nonzero offsets force resolution
/// along that axis; both nonzero marks a diagonal neighbor resolved against
/// its corner vertex. Tiles produced for the body's own cell leave both 0.
#[derive(Copy, Clone, Debug)]
pub struct Tile {
    pub cell: (i32, i32),
    pub center: Vec2,
    pub half_extents: Vec2,
    pub shape: TileShape,
    pub sign: Vec2,
    pub collide: EdgeFlags,
    pub oh: i32,
    pub ov: i32,
}

impl Tile {
    pub fn new(cell: (i32, i32), center: Vec2, half_extents: Vec2, shape: TileShape) -> Self {
        Self {
            cell,
            center,
            half_extents,
            shape,
            sign: Vec2::ZERO,
            collide: EdgeFlags::ALL,
            oh: 0,
            ov: 0,
        }
    }

    pub fn full(cell: (i32, i32), center: Vec2, half_extents: Vec2) -> Self {
        Self::new(cell, center, half_extents, TileShape::Full)
    }

    /// Set the facing signs for a shaped tile.
    pub fn with_sign(mut self, sign_x: f32, sign_y: f32) -> Self {
        debug_assert!(sign_x.abs() <= 1.0 && sign_y.abs() <= 1.0);
        self.sign = Vec2::new(sign_x, sign_y);
        self
    }

    pub fn with_collide(mut self, collide: EdgeFlags) -> Self {
        self.collide = collide;
        self
    }

    /// Mark this tile as a neighbor of the colliding body's home cell.
    pub fn with_neighbor_offset(mut self, oh: i32, ov: i32) -> Self {
        debug_assert!(oh.abs() <= 1 && ov.abs() <= 1);
        self.oh = oh;
        self.ov = ov;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center, self.half_extents)
    }

    /// Unit normal of the sloped surface. Zero for shapes whose normal is
    /// found at resolve time (full tiles and circular corners).
    pub fn slope_normal(&self) -> Vec2 {
        // 22/67 degree slopes rise 1-in-2; normal length is sqrt(5).
        let inv_sqrt5 = 1.0 / 5.0f32.sqrt();
        match self.shape {
            TileShape::Half => self.sign,
            TileShape::Slope45 => self.sign * FRAC_1_SQRT_2,
            TileShape::Slope22Low | TileShape::Slope22High => {
                Vec2::new(self.sign.x * inv_sqrt5, self.sign.y * 2.0 * inv_sqrt5)
            }
            TileShape::Slope67Low | TileShape::Slope67High => {
                Vec2::new(self.sign.x * 2.0 * inv_sqrt5, self.sign.y * inv_sqrt5)
            }
            TileShape::Full | TileShape::Convex | TileShape::Concave => Vec2::ZERO,
        }
    }
}

/// Resolve one body against one tile.
///
/// Penetration depth is computed on both axes against the tile's half
/// extents; full tiles resolve along the smaller one unless a neighbor
/// offset forces the axis or a diagonal offset routes resolution through
/// the corner vertex. Shaped tiles project the body's innermost point onto
/// the slope normal and pick the shorter of the axis and slope corrections.
///
/// With `separate` false this reports contact and sets `touching`/`blocked`
/// flags without moving the body or touching its velocity.
pub fn collide_body_tile(body: &mut Body, tile: &Tile, bias: f32, separate: bool) -> TileHit {
    if !body.enable || !tile.collide.any() {
        return TileHit::None;
    }

    let d = body.center() - tile.center;
    let px = (tile.half_extents.x + body.half_extents().x) - d.x.abs();
    if px <= 0.0 {
        return TileHit::None;
    }
    let py = (tile.half_extents.y + body.half_extents().y) - d.y.abs();
    if py <= 0.0 {
        return TileHit::None;
    }

    // Signed minimum-translation vector along the smaller axis.
    let axis_mtv = if px < py {
        Vec2::new(if d.x < 0.0 { -px } else { px }, 0.0)
    } else {
        Vec2::new(0.0, if d.y < 0.0 { -py } else { py })
    };

    match tile.shape {
        TileShape::Full => resolve_full(body, tile, px, py, d, axis_mtv, bias, separate),
        TileShape::Half | TileShape::Slope45 | TileShape::Slope22High | TileShape::Slope67High => {
            resolve_slope(body, tile, axis_mtv, separate)
        }
        TileShape::Slope22Low => resolve_slope_22_low(body, tile, axis_mtv, separate),
        TileShape::Slope67Low => resolve_slope_67_low(body, tile, axis_mtv, separate),
        TileShape::Convex => resolve_convex(body, tile, axis_mtv, separate),
        TileShape::Concave => resolve_concave(body, tile, axis_mtv, separate),
    }
}

fn resolve_full(
    body: &mut Body,
    tile: &Tile,
    px: f32,
    py: f32,
    d: Vec2,
    axis_mtv: Vec2,
    bias: f32,
    separate: bool,
) -> TileHit {
    match (tile.oh, tile.ov) {
        (0, 0) => {
            // Tile under the body's own cell: project along the smaller
            // penetration, falling back to the other axis when the first
            // face is disabled or the overlap is too deep for one step.
            let (first, second) = if px < py {
                let x = Vec2::new(if d.x < 0.0 { -px } else { px }, 0.0);
                let y = Vec2::new(0.0, if d.y < 0.0 { -py } else { py });
                (x, y)
            } else {
                let y = Vec2::new(0.0, if d.y < 0.0 { -py } else { py });
                let x = Vec2::new(if d.x < 0.0 { -px } else { px }, 0.0);
                (y, x)
            };
            for mtv in [first, second] {
                if axis_face_open(body, tile, mtv) && within_bias(body, mtv, bias) {
                    apply_collision(body, mtv, mtv.normalize_or_zero(), separate);
                    return TileHit::Face;
                }
            }
            TileHit::None
        }
        (oh, 0) => {
            // Horizontal neighbor: resolution is forced along X.
            let mtv = Vec2::new(px * -(oh as f32), 0.0);
            if axis_face_open(body, tile, mtv) {
                apply_collision(body, mtv, Vec2::new(-(oh as f32), 0.0), separate);
                TileHit::Face
            } else {
                TileHit::None
            }
        }
        (0, ov) => {
            let mtv = Vec2::new(0.0, py * -(ov as f32));
            if axis_face_open(body, tile, mtv) {
                apply_collision(body, mtv, Vec2::new(0.0, -(ov as f32)), separate);
                TileHit::Face
            } else {
                TileHit::None
            }
        }
        (oh, ov) => resolve_corner(body, tile, oh, ov, separate),
    }
}

/// Diagonal neighbor: project the body away from the tile's corner vertex.
fn resolve_corner(body: &mut Body, tile: &Tile, oh: i32, ov: i32, separate: bool) -> TileHit {
    let escape = Vec2::new(-(oh as f32), -(ov as f32));
    // The corner faces the body; a corner with both adjacent faces disabled
    // is no tile at all from this direction.
    let horizontal_open = if oh > 0 { tile.collide.left } else { tile.collide.right };
    let vertical_open = if ov > 0 { tile.collide.up } else { tile.collide.down };
    if !horizontal_open && !vertical_open {
        return TileHit::None;
    }

    let vertex = tile.center + Vec2::new(escape.x * tile.half_extents.x, escape.y * tile.half_extents.y);
    let to_body = body.center() - vertex;
    let len = to_body.length();
    let dir = if len == 0.0 {
        // Body center exactly on the vertex: push out at 45 degrees.
        escape * FRAC_1_SQRT_2
    } else {
        to_body / len
    };

    // Distance from the body center to its surface along `dir`.
    let half = body.half_extents();
    let reach = dir.x.abs() * half.x + dir.y.abs() * half.y;
    let pen = reach - len;
    if pen <= 0.0 {
        return TileHit::None;
    }

    apply_collision(body, dir * pen, dir, separate);
    TileHit::Corner
}

/// Half tiles, 45 degree slopes, and the high halves of 22/67 degree slopes
/// share one scheme: take the body corner nearest the surface, project it
/// onto the slope normal, and resolve along whichever of the axis MTV and
/// the slope correction is shorter.
fn resolve_slope(body: &mut Body, tile: &Tile, axis_mtv: Vec2, separate: bool) -> TileHit {
    let n = tile.slope_normal();
    let inner = innermost_point(body, tile.sign);
    let anchor = match tile.shape {
        // The surface passes through the tile center.
        TileShape::Half | TileShape::Slope45 => tile.center,
        TileShape::Slope22High => Vec2::new(
            tile.center.x - tile.sign.x * tile.half_extents.x,
            tile.center.y + tile.sign.y * tile.half_extents.y,
        ),
        TileShape::Slope67High => Vec2::new(
            tile.center.x + tile.sign.x * tile.half_extents.x,
            tile.center.y - tile.sign.y * tile.half_extents.y,
        ),
        _ => unreachable!("resolve_slope called with a non-slope shape"),
    };

    let dp = (inner - anchor).dot(n);
    if dp >= 0.0 {
        return TileHit::None;
    }

    pick_axis_or_slope(body, axis_mtv, n * -dp, n, separate)
}

/// Low half of a 22 degree slope: the body must actually reach below the
/// tile's top edge before the slope test applies, and shallow contacts
/// resolve straight along Y against that edge.
fn resolve_slope_22_low(body: &mut Body, tile: &Tile, axis_mtv: Vec2, separate: bool) -> TileHit {
    let sign = tile.sign;
    let inner_y = body.center().y - sign.y * body.half_extents().y;
    let pen_y = tile.center.y - inner_y;
    if pen_y * sign.y <= 0.0 {
        return TileHit::None;
    }

    let inner = innermost_point(body, sign);
    let anchor = Vec2::new(
        tile.center.x + sign.x * tile.half_extents.x,
        tile.center.y - sign.y * tile.half_extents.y,
    );
    let n = tile.slope_normal();
    let dp = (inner - anchor).dot(n);
    if dp >= 0.0 {
        return TileHit::None;
    }

    let slope_mtv = n * -dp;
    let edge_mtv = Vec2::new(0.0, pen_y);
    let shorter = axis_mtv.length().min(slope_mtv.length());
    if pen_y.abs() < shorter {
        let n_edge = Vec2::new(0.0, pen_y.signum());
        apply_collision(body, edge_mtv, n_edge, separate);
        return TileHit::Corner;
    }

    pick_axis_or_slope(body, axis_mtv, slope_mtv, n, separate)
}

/// Low half of a 67 degree slope: mirror of the 22 degree case on X.
fn resolve_slope_67_low(body: &mut Body, tile: &Tile, axis_mtv: Vec2, separate: bool) -> TileHit {
    let sign = tile.sign;
    let inner_x = body.center().x - sign.x * body.half_extents().x;
    let pen_x = tile.center.x - inner_x;
    if pen_x * sign.x <= 0.0 {
        return TileHit::None;
    }

    let inner = innermost_point(body, sign);
    let anchor = Vec2::new(
        tile.center.x - sign.x * tile.half_extents.x,
        tile.center.y + sign.y * tile.half_extents.y,
    );
    let n = tile.slope_normal();
    let dp = (inner - anchor).dot(n);
    if dp >= 0.0 {
        return TileHit::None;
    }

    let slope_mtv = n * -dp;
    let edge_mtv = Vec2::new(pen_x, 0.0);
    let shorter = axis_mtv.length().min(slope_mtv.length());
    if pen_x.abs() < shorter {
        let n_edge = Vec2::new(pen_x.signum(), 0.0);
        apply_collision(body, edge_mtv, n_edge, separate);
        return TileHit::Corner;
    }

    pick_axis_or_slope(body, axis_mtv, slope_mtv, n, separate)
}

/// Quarter-circle bump: solid except for a circular arc centered on one
/// corner and spanning the whole tile.
fn resolve_convex(body: &mut Body, tile: &Tile, axis_mtv: Vec2, separate: bool) -> TileHit {
    let sign = tile.sign;
    let arc_center = tile.center - Vec2::new(sign.x * tile.half_extents.x, sign.y * tile.half_extents.y);
    let o = innermost_point(body, sign) - arc_center;
    let rad = tile.half_extents.x * 2.0;

    if sign.x * o.x < 0.0 || sign.y * o.y < 0.0 {
        // Nearest corner is outside the quarter of the arc that is solid.
        apply_collision(body, axis_mtv, axis_mtv.normalize_or_zero(), separate);
        return TileHit::Face;
    }

    let len = o.length();
    let pen = rad - len;
    if pen <= 0.0 {
        return TileHit::None;
    }

    let dir = if len == 0.0 {
        Vec2::new(sign.x, sign.y) * FRAC_1_SQRT_2
    } else {
        o / len
    };
    apply_collision(body, dir * pen, dir, separate);
    TileHit::Corner
}

/// Quarter-circle cutout: solid everywhere outside an arc centered on the
/// open corner.
fn resolve_concave(body: &mut Body, tile: &Tile, axis_mtv: Vec2, separate: bool) -> TileHit {
    let sign = tile.sign;
    let arc_center = tile.center + Vec2::new(sign.x * tile.half_extents.x, sign.y * tile.half_extents.y);
    let o = arc_center - innermost_point(body, sign);
    let rad = tile.half_extents.x * 2.0;

    let len = o.length();
    let pen = len - rad;
    if pen <= 0.0 {
        return TileHit::None;
    }

    if axis_mtv.length() < pen {
        apply_collision(body, axis_mtv, axis_mtv.normalize_or_zero(), separate);
        TileHit::Face
    } else {
        // len >= pen + rad > 0 here, so the division is safe.
        let dir = o / len;
        apply_collision(body, dir * pen, dir, separate);
        TileHit::Corner
    }
}

fn pick_axis_or_slope(
    body: &mut Body,
    axis_mtv: Vec2,
    slope_mtv: Vec2,
    slope_normal: Vec2,
    separate: bool,
) -> TileHit {
    if axis_mtv.length() < slope_mtv.length() {
        apply_collision(body, axis_mtv, axis_mtv.normalize_or_zero(), separate);
        TileHit::Face
    } else {
        apply_collision(body, slope_mtv, slope_normal, separate);
        TileHit::Corner
    }
}

/// Corner of the body nearest the solid part of a shaped tile.
fn innermost_point(body: &Body, sign: Vec2) -> Vec2 {
    body.center() - Vec2::new(sign.x * body.half_extents().x, sign.y * body.half_extents().y)
}

/// A face is open when both the tile edge being struck and the matching
/// body edge have collision enabled. A disabled face is "no tile" from that
/// direction only.
fn axis_face_open(body: &Body, tile: &Tile, mtv: Vec2) -> bool {
    if mtv.x < 0.0 {
        tile.collide.left && body.check_collision.right
    } else if mtv.x > 0.0 {
        tile.collide.right && body.check_collision.left
    } else if mtv.y < 0.0 {
        tile.collide.up && body.check_collision.down
    } else if mtv.y > 0.0 {
        tile.collide.down && body.check_collision.up
    } else {
        false
    }
}

/// Reject overlaps deeper than the body could have produced this step;
/// residue from the previous resolution stays within `bias`.
fn within_bias(body: &Body, mtv: Vec2, bias: f32) -> bool {
    if mtv.x != 0.0 {
        mtv.x.abs() <= body.delta().x.abs() + bias
    } else {
        mtv.y.abs() <= body.delta().y.abs() + bias
    }
}

/// Shared response for every tile resolution path.
///
/// Flags are set from the push normal; position and velocity change only in
/// separating mode, and velocity only when the body is actually moving into
/// the contact. The normal component of velocity is removed and reflected
/// through the body's per-axis bounce.
fn apply_collision(body: &mut Body, push: Vec2, normal: Vec2, separate: bool) {
    if normal.x > 0.0 {
        body.touching.left = true;
        body.blocked.left = true;
    } else if normal.x < 0.0 {
        body.touching.right = true;
        body.blocked.right = true;
    }
    if normal.y > 0.0 {
        body.touching.up = true;
        body.blocked.up = true;
    } else if normal.y < 0.0 {
        body.touching.down = true;
        body.blocked.down = true;
    }

    if !separate {
        return;
    }

    body.position += push;
    body.sync_bounds();

    let dp = body.velocity.dot(normal);
    if dp < 0.0 {
        let restitution = normal.x.abs() * body.bounce.x + normal.y.abs() * body.bounce.y;
        body.velocity -= normal * (dp * (1.0 + restitution));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::OwnerId;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const HALF: f32 = 16.0;

    fn tile_at(x: f32, y: f32) -> Tile {
        Tile::full((0, 0), Vec2::new(x, y), Vec2::splat(HALF))
    }

    fn body_centered(x: f32, y: f32) -> Body {
        let size = Vec2::splat(10.0);
        let mut b = Body::new(OwnerId(7), Vec2::new(x, y) - size * 0.5, size);
        b.reset_step_flags();
        b
    }

    #[test]
    fn full_tile_resolves_along_smaller_penetration() {
        // Body sunk 3 into the tile's top edge, 8 into its left: Y wins.
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(-13.0, -18.0);
        b.velocity = Vec2::new(0.0, 5.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.bottom(), -HALF);
        assert!(b.touching.down && b.blocked.down);
        assert!(b.on_floor());
        assert_relative_eq!(b.velocity.y, 0.0);
    }

    #[test]
    fn bounce_reflects_velocity_on_face_hit() {
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(0.0, -19.0);
        b.velocity = Vec2::new(0.0, 10.0);
        b.bounce.y = 0.5;

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.velocity.y, -5.0);
    }

    #[test]
    fn no_overlap_is_no_contact() {
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(100.0, 0.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
        assert!(!b.touching.any());
    }

    #[test]
    fn disabled_face_falls_through_to_other_axis() {
        // Smaller penetration is on Y, but the tile's top face is off, so
        // the hit resolves on X instead.
        let tile = tile_at(0.0, 0.0).with_collide(EdgeFlags {
            up: false,
            ..EdgeFlags::ALL
        });
        let mut b = body_centered(-19.0, -18.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.right(), -HALF);
        assert!(b.touching.right);
        assert!(!b.touching.down);
    }

    #[test]
    fn all_faces_disabled_is_no_tile() {
        let tile = tile_at(0.0, 0.0).with_collide(EdgeFlags::NONE);
        let mut b = body_centered(0.0, -18.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }

    #[test]
    fn body_edge_flags_gate_too() {
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(0.0, -18.0);
        b.check_collision.down = false;
        // Top face of the tile would resolve via the body's bottom edge.
        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        // Falls through to X, where the overlap is deeper but still allowed.
        assert!(hit == TileHit::None || !b.touching.down);
    }

    #[test]
    fn overlap_deeper_than_bias_is_rejected() {
        let tile = tile_at(0.0, 0.0);
        // Sunk halfway into the tile with no per-step movement to explain it.
        let mut b = body_centered(0.0, -12.0);
        let hit = collide_body_tile(&mut b, &tile, 2.0, true);
        assert_eq!(hit, TileHit::None);
        assert_relative_eq!(b.position.y, -17.0);
    }

    #[test]
    fn horizontal_neighbor_forces_x_resolution() {
        // Penetration is smaller on Y, but the tile is flagged as the cell
        // to the body's right, so X is forced.
        let tile = tile_at(0.0, 0.0).with_neighbor_offset(1, 0);
        let mut b = body_centered(-19.0, -18.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.right(), -HALF);
        assert!(b.touching.right);
    }

    #[test]
    fn vertical_neighbor_forces_y_resolution() {
        let tile = tile_at(0.0, 0.0).with_neighbor_offset(0, 1);
        let mut b = body_centered(-19.0, -14.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.bottom(), -HALF);
        assert!(b.touching.down);
    }

    #[test]
    fn diagonal_neighbor_projects_from_corner() {
        // Tile sits down-right of the body's cell; body overlaps its
        // top-left corner.
        let tile = tile_at(0.0, 0.0).with_neighbor_offset(1, 1);
        let mut b = body_centered(-18.0, -18.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Corner);
        // Pushed up-left, away from the corner vertex.
        assert!(b.center().x < -18.0);
        assert!(b.center().y < -18.0);
        // Vertex no longer inside the body.
        let v = Vec2::new(-HALF, -HALF);
        let to_body = b.center() - v;
        let reach = to_body.normalize().x.abs() * 5.0 + to_body.normalize().y.abs() * 5.0;
        assert!(to_body.length() >= reach - 1e-4);
    }

    #[test]
    fn corner_vertex_coincident_with_center_uses_45_degrees() {
        let tile = tile_at(0.0, 0.0).with_neighbor_offset(1, 1);
        // Body center exactly on the tile's top-left vertex.
        let mut b = body_centered(-HALF, -HALF);
        b.velocity = Vec2::new(3.0, 3.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Corner);
        assert!(b.position.x.is_finite() && b.position.y.is_finite());
        assert!(b.velocity.x.is_finite() && b.velocity.y.is_finite());
        // Pushed along (-1,-1)/sqrt(2).
        let moved = b.center() - Vec2::new(-HALF, -HALF);
        assert_abs_diff_eq!(moved.x, moved.y, epsilon = 1e-5);
        assert!(moved.x < 0.0);
    }

    #[test]
    fn overlap_only_reports_without_mutation() {
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(0.0, -18.0);
        b.velocity = Vec2::new(0.0, 5.0);
        let before = b.position;

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, false);
        assert_eq!(hit, TileHit::Face);
        assert_eq!(b.position, before);
        assert_relative_eq!(b.velocity.y, 5.0);
        assert!(b.touching.down && b.blocked.down);
    }

    #[test]
    fn disabled_body_is_skipped() {
        let tile = tile_at(0.0, 0.0);
        let mut b = body_centered(0.0, -18.0);
        b.enable = false;
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }

    #[test]
    fn floor_slope_45_carries_body_along_surface() {
        // Floor slope rising to the right: solid lower-right triangle,
        // normal pointing up-left.
        let tile = tile_at(0.0, 0.0).with_sign(-1.0, -1.0);
        let tile = Tile {
            shape: TileShape::Slope45,
            ..tile
        };
        // Body resting near the tile center, slightly inside the surface.
        let mut b = body_centered(0.0, -6.0);
        b.velocity = Vec2::new(0.0, 4.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Corner);
        // Pushed out along the up-left normal.
        assert!(b.center().y < -6.0);
        assert!(b.center().x < 0.0);
        assert!(b.touching.down);
    }

    #[test]
    fn slope_45_shallow_clip_resolves_on_axis() {
        let tile = Tile {
            shape: TileShape::Slope45,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        // Barely clipping the tile from the left: axis MTV is much shorter
        // than the slope projection.
        let mut b = body_centered(-20.0, 12.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Face);
        assert_relative_eq!(b.right(), -HALF);
    }

    #[test]
    fn slope_45_clear_side_is_no_contact() {
        let tile = Tile {
            shape: TileShape::Slope45,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        // Inside the tile's AABB but on the empty upper-left half.
        let mut b = body_centered(-12.0, -12.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }

    #[test]
    fn half_tile_open_side_is_empty() {
        // Solid lower half; sign points up (the exposed surface normal).
        let tile = Tile {
            shape: TileShape::Half,
            ..tile_at(0.0, 0.0).with_sign(0.0, -1.0)
        };
        // Hovering in the open upper half.
        let mut b = body_centered(0.0, -10.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);

        // Pressed into the solid half from above.
        let mut b = body_centered(0.0, 2.0);
        b.velocity = Vec2::new(0.0, 3.0);
        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert!(hit.is_contact());
        assert!(b.touching.down);
        assert!(b.center().y < 2.0);
    }

    #[test]
    fn slope_22_low_above_surface_is_clear() {
        // Shallow floor slope, low half; solid sliver along the bottom.
        let tile = Tile {
            shape: TileShape::Slope22Low,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        let mut b = body_centered(0.0, -10.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }

    #[test]
    fn slope_22_low_contact_reports_hit() {
        let tile = Tile {
            shape: TileShape::Slope22Low,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        // Sunk just below the tile's midline where the slope lives.
        let mut b = body_centered(0.0, 8.0);
        b.velocity = Vec2::new(0.0, 2.0);
        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert!(hit.is_contact());
        assert!(b.touching.down);
    }

    #[test]
    fn slope_22_high_resolves_along_slope_normal() {
        // Upper half of a shallow floor slope rising right: surface runs
        // from the tile's left-center up to its top-right corner.
        let tile = Tile {
            shape: TileShape::Slope22High,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        let mut b = body_centered(0.0, -14.0);
        b.velocity = Vec2::new(0.0, 3.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Corner);
        assert!(b.touching.down);
        // Pushed out along the up-left normal.
        assert!(b.center().y < -14.0);
    }

    #[test]
    fn slope_67_low_resolves_against_steep_wall() {
        // Low half of a steep slope, solid toward the lower-right; the body
        // presses into it from the left.
        let tile = Tile {
            shape: TileShape::Slope67Low,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        let mut b = body_centered(8.0, 0.0);
        b.velocity = Vec2::new(2.0, 0.0);

        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert_eq!(hit, TileHit::Corner);
        assert!(b.touching.right);
        assert!(b.center().x < 8.0);
    }

    #[test]
    fn slope_67_low_clear_on_open_side() {
        let tile = Tile {
            shape: TileShape::Slope67Low,
            ..tile_at(0.0, 0.0).with_sign(-1.0, -1.0)
        };
        // Inside the AABB but left of where the solid wedge starts.
        let mut b = body_centered(-18.0, 0.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }

    #[test]
    fn convex_corner_bumps_radially() {
        // Quarter circle solid toward the lower-left, arc centered on the
        // lower-left corner.
        let tile = Tile {
            shape: TileShape::Convex,
            ..tile_at(0.0, 0.0).with_sign(1.0, -1.0)
        };
        // Body near the arc edge, inside the radius.
        let mut b = body_centered(4.0, -16.0);
        let before = b.center();
        let hit = collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true);
        assert!(hit.is_contact());
        assert_ne!(b.center(), before);
    }

    #[test]
    fn concave_cutout_inside_arc_is_clear() {
        // Cutout opening toward the upper-right corner.
        let tile = Tile {
            shape: TileShape::Concave,
            ..tile_at(0.0, 0.0).with_sign(1.0, -1.0)
        };
        // Body tucked into the open arc near that corner.
        let mut b = body_centered(12.0, -12.0);
        assert_eq!(collide_body_tile(&mut b, &tile, OVERLAP_BIAS, true), TileHit::None);
    }
}
