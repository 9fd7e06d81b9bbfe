use crate::body::Body;

/// Resolution axis. Separation is two-pass, X then Y, each axis computed
/// independently; simultaneous diagonal overlaps therefore resolve in a
/// fixed but arbitrary axis order. Downstream code relies on that order,
/// so don't replace it with a single minimum-translation pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Post-impact velocities for one pair on one axis, computed up front so
/// the branchy separation logic just picks a value instead of re-deriving
/// it. A zero mass on either side counts as infinite resistance: the
/// mass-weighted exchange is disabled and the body behaves as immovable.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImpactParams {
    /// Velocity for body A when both bodies are pushable.
    pub mass_a: f32,
    /// Velocity for body B when both bodies are pushable.
    pub mass_b: f32,
    /// Velocity for body A when it alone absorbs the hit.
    pub full_a: f32,
    /// Velocity for body B when it alone absorbs the hit.
    pub full_b: f32,
}

impl ImpactParams {
    pub fn compute(a: &Body, b: &Body, axis: Axis) -> Self {
        let (va, vb, bounce_a, bounce_b) = match axis {
            Axis::X => (a.velocity.x, b.velocity.x, a.bounce.x, b.bounce.x),
            Axis::Y => (a.velocity.y, b.velocity.y, a.bounce.y, b.bounce.y),
        };

        let full_a = vb - va * bounce_a;
        let full_b = va - vb * bounce_b;

        let (mass_a, mass_b) = if a.mass > 0.0 && b.mass > 0.0 {
            // Inelastic exchange weighted by relative mass: each body takes
            // on the other's momentum contribution, recentered on the mean.
            let mut nva = (vb * vb * b.mass / a.mass).sqrt() * sign_of(vb);
            let mut nvb = (va * va * a.mass / b.mass).sqrt() * sign_of(va);
            let avg = (nva + nvb) * 0.5;
            nva -= avg;
            nvb -= avg;
            (avg + nva * bounce_a, avg + nvb * bounce_b)
        } else {
            (0.0, 0.0)
        };

        Self {
            mass_a,
            mass_b,
            full_a,
            full_b,
        }
    }
}

fn sign_of(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Separate a confirmed-overlapping pair.
///
/// Returns true if the bodies were in contact on at least one axis (their
/// `touching` flags will have been set); position and velocity have been
/// corrected according to the pushable/immovable rules. A false return
/// means no overlap on either axis and no state change at all.
pub fn separate(a: &mut Body, b: &mut Body) -> bool {
    let x = separate_axis(a, b, Axis::X, false);
    let y = separate_axis(a, b, Axis::Y, false);
    x || y
}

/// Overlap-only variant: sets `touching` flags and reports contact, but
/// never moves a body or rewrites a velocity.
pub fn touch_only(a: &mut Body, b: &mut Body) -> bool {
    let x = separate_axis(a, b, Axis::X, true);
    let y = separate_axis(a, b, Axis::Y, true);
    x || y
}

pub(crate) fn separate_axis(a: &mut Body, b: &mut Body, axis: Axis, overlap_only: bool) -> bool {
    let (ab, bb) = (a.bounds(), b.bounds());
    let overlap = match axis {
        Axis::X => ab.overlap_x(&bb),
        Axis::Y => ab.overlap_y(&bb),
    };
    if overlap <= 0.0 {
        return false;
    }
    // Contact needs overlap on the other axis too, else the boxes only
    // share a column/row of space without actually intersecting.
    let cross = match axis {
        Axis::X => ab.overlap_y(&bb),
        Axis::Y => ab.overlap_x(&bb),
    };
    if cross <= 0.0 {
        return false;
    }

    // Which side of B does A sit on, along this axis.
    let a_low = match axis {
        Axis::X => a.center().x <= b.center().x,
        Axis::Y => a.center().y <= b.center().y,
    };

    mark_touching(a, b, axis, a_low);

    if overlap_only {
        return true;
    }
    if a.immovable && b.immovable {
        // Nothing we are allowed to move; contact is still reported.
        return true;
    }

    let (va, vb) = match axis {
        Axis::X => (a.velocity.x, b.velocity.x),
        Axis::Y => (a.velocity.y, b.velocity.y),
    };
    let a_stationary = va == 0.0;
    let b_stationary = vb == 0.0;
    // Driving into the contact, not away from it.
    let a_closing = (va > 0.0 && a_low) || (va < 0.0 && !a_low);
    let b_closing = (vb > 0.0 && !a_low) || (vb < 0.0 && a_low);

    let params = ImpactParams::compute(a, b, axis);
    let a_pushable = a.pushable && !a.immovable && a.mass > 0.0;
    let b_pushable = b.pushable && !b.immovable && b.mass > 0.0;

    // Direction that moves A off of B.
    let a_dir = if a_low { -1.0 } else { 1.0 };

    if a_pushable && b_pushable {
        // A lone mover absorbs the idle body's half of the correction too,
        // which reads as a push instead of a symmetric bounce apart.
        let half = overlap * 0.5;
        if a_closing && b_stationary {
            shift(a, axis, a_dir * overlap);
        } else if b_closing && a_stationary {
            shift(b, axis, -a_dir * overlap);
        } else {
            shift(a, axis, a_dir * half);
            shift(b, axis, -a_dir * half);
        }
        set_velocity(a, axis, params.mass_a);
        set_velocity(b, axis, params.mass_b);
    } else if a_pushable {
        shift(a, axis, a_dir * overlap);
        set_velocity(a, axis, params.full_a);
    } else if b_pushable {
        shift(b, axis, -a_dir * overlap);
        set_velocity(b, axis, params.full_b);
    } else {
        // Neither body trades velocity.
        if a_closing && b_stationary {
            shift(a, axis, a_dir * overlap);
            set_velocity(a, axis, 0.0);
            set_velocity(b, axis, 0.0);
        } else if b_closing && a_stationary {
            shift(b, axis, -a_dir * overlap);
            set_velocity(a, axis, 0.0);
            set_velocity(b, axis, 0.0);
        } else if a_closing && b_closing {
            let half = overlap * 0.5;
            shift(a, axis, a_dir * half);
            shift(b, axis, -a_dir * half);
            set_velocity(a, axis, 0.0);
            set_velocity(b, axis, 0.0);
        } else {
            // Same-direction convoy: no positional correction, but stop the
            // trailing body from driving through the leader by matching the
            // leader's speed to it.
            let shared_positive = va > 0.0 || vb > 0.0;
            let a_leads = if shared_positive { !a_low } else { a_low };
            if a_leads {
                set_velocity(a, axis, vb);
            } else {
                set_velocity(b, axis, va);
            }
        }
    }

    true
}

fn shift(body: &mut Body, axis: Axis, amount: f32) {
    match axis {
        Axis::X => body.position.x += amount,
        Axis::Y => body.position.y += amount,
    }
    body.sync_bounds();
}

fn set_velocity(body: &mut Body, axis: Axis, value: f32) {
    match axis {
        Axis::X => body.velocity.x = value,
        Axis::Y => body.velocity.y = value,
    }
}

fn mark_touching(a: &mut Body, b: &mut Body, axis: Axis, a_low: bool) {
    match (axis, a_low) {
        (Axis::X, true) => {
            a.touching.right = true;
            b.touching.left = true;
        }
        (Axis::X, false) => {
            a.touching.left = true;
            b.touching.right = true;
        }
        (Axis::Y, true) => {
            a.touching.down = true;
            b.touching.up = true;
        }
        (Axis::Y, false) => {
            a.touching.up = true;
            b.touching.down = true;
        }
    }
}
