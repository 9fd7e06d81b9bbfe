use glam::Vec2;

/// Axis-aligned rectangle stored as top-left corner plus extents.
///
/// `width` and `height` are never negative; constructors debug-assert it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative rect extents");
        Self { x, y, width, height }
    }

    /// Build from a center point and half extents.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(
            center.x - half_extents.x,
            center.y - half_extents.y,
            half_extents.x * 2.0,
            half_extents.y * 2.0,
        )
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Zero-area rects cannot meaningfully partition space or overlap anything.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// True if `other` lies entirely inside this rect (shared edges count).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.overlap_x(other) > 0.0 && self.overlap_y(other) > 0.0
    }

    /// Width of the horizontal interval shared with `other`; <= 0 means no overlap.
    pub fn overlap_x(&self, other: &Rect) -> f32 {
        self.right().min(other.right()) - self.left().max(other.left())
    }

    /// Height of the vertical interval shared with `other`; <= 0 means no overlap.
    pub fn overlap_y(&self, other: &Rect) -> f32 {
        self.bottom().min(other.bottom()) - self.top().max(other.top())
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let ox = self.overlap_x(other);
        let oy = self.overlap_y(other);
        if ox <= 0.0 || oy <= 0.0 {
            return None;
        }
        Some(Rect::new(
            self.left().max(other.left()),
            self.top().max(other.top()),
            ox,
            oy,
        ))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        Rect::new(
            left,
            top,
            self.right().max(other.right()) - left,
            self.bottom().max(other.bottom()) - top,
        )
    }

    /// Grow (or shrink, with negative `pad`) the rect by `pad` on every side.
    pub fn inflated(&self, pad: f32) -> Rect {
        Rect::new(
            self.x - pad,
            self.y - pad,
            (self.width + pad * 2.0).max(0.0),
            (self.height + pad * 2.0).max(0.0),
        )
    }

    /// Closest point on or inside the rect to `p`.
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left(), self.right()),
            p.y.clamp(self.top(), self.bottom()),
        )
    }
}

/// Circle described by center and radius.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        debug_assert!(radius >= 0.0, "negative circle radius");
        Self { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        let r = self.radius + other.radius;
        (other.center - self.center).length_squared() <= r * r
    }

    /// Closest-point test against a rect.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let closest = rect.clamp_point(self.center);
        (closest - self.center).length_squared() <= self.radius * self.radius
    }

    /// Distance from the circle's edge to `p`; negative when `p` is inside.
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.center).length() - self.radius
    }
}

/// Line segment from `a` to `b`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f32 {
        (self.b - self.a).length()
    }

    /// Loose bounding rect of the segment, for broad-phase queries.
    pub fn bounds(&self) -> Rect {
        let min = self.a.min(self.b);
        let max = self.a.max(self.b);
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let d = self.b - self.a;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return self.a;
        }
        let t = ((p - self.a).dot(d) / len_sq).clamp(0.0, 1.0);
        self.a + d * t
    }

    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    /// Slab test clamped to the segment's parameter range.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let d = self.b - self.a;
        let mut tmin = 0.0f32;
        let mut tmax = 1.0f32;

        for axis in 0..2 {
            let (origin, dir, lo, hi) = if axis == 0 {
                (self.a.x, d.x, rect.left(), rect.right())
            } else {
                (self.a.y, d.y, rect.top(), rect.bottom())
            };

            if dir.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
            } else {
                let inv = 1.0 / dir;
                let mut t1 = (lo - origin) * inv;
                let mut t2 = (hi - origin) * inv;
                if t1 > t2 {
                    core::mem::swap(&mut t1, &mut t2);
                }
                tmin = tmin.max(t1);
                tmax = tmax.min(t2);
                if tmin > tmax {
                    return false;
                }
            }
        }

        true
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        self.distance_to(circle.center) <= circle.radius
    }
}
