use std::collections::HashSet;

use glam::Vec2;
use log::{debug, warn};

use crate::body::{Body, OwnerId};
use crate::error::CollideError;
use crate::math::{Circle, Rect, Segment};
use crate::quadtree::{QuadTree, QuadTreeConfig};
use crate::separate::{separate, touch_only};
use crate::tile::{collide_body_tile, Tile, TileHit, OVERLAP_BIAS};

/// World-level tunables.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Playfield rect used for the spatial index and world-bounds collision.
    /// Degenerate bounds disable the index (broad-phase scans linearly).
    pub bounds: Rect,
    pub gravity: Vec2,
    pub quadtree: QuadTreeConfig,
    /// Anti-tunneling allowance for tile resolution.
    pub overlap_bias: f32,
    /// Hard cap on narrow-phase resolutions per collide/overlap call.
    pub max_pairs_per_call: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            gravity: Vec2::ZERO,
            quadtree: QuadTreeConfig::default(),
            overlap_bias: OVERLAP_BIAS,
            max_pairs_per_call: 8192,
        }
    }
}

/// Stable reference to a body owned by a `World`.
///
/// Handles to removed bodies go stale rather than aliasing whatever body
/// reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// Reference to an ordered set of bodies collided as one unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(u32);

/// One side of a collide/overlap call: a body, a group, or a nested list
/// of either.
#[derive(Copy, Clone, Debug)]
pub enum ColliderRef<'a> {
    Body(BodyHandle),
    Group(GroupId),
    List(&'a [ColliderRef<'a>]),
}

impl From<BodyHandle> for ColliderRef<'_> {
    fn from(h: BodyHandle) -> Self {
        ColliderRef::Body(h)
    }
}

impl From<GroupId> for ColliderRef<'_> {
    fn from(g: GroupId) -> Self {
        ColliderRef::Group(g)
    }
}

/// Pair filter run before separation; returning false vetoes the pair.
pub type ProcessCallback<'a> = &'a mut dyn FnMut(&Body, &Body) -> bool;
/// Confirmed-contact callback, called with the owner ids in call order.
pub type NotifyCallback<'a> = &'a mut dyn FnMut(OwnerId, OwnerId);
/// Tile pair filter; returning false skips the tile.
pub type TileProcessCallback<'a> = &'a mut dyn FnMut(&Body, &Tile) -> bool;
/// Confirmed tile-contact callback.
pub type TileNotifyCallback<'a> = &'a mut dyn FnMut(OwnerId, &Tile, TileHit);

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Owns every body, steps them, and runs the collision pipeline.
///
/// The spatial index is rebuilt from scratch at the end of every step and
/// thrown away on the next one; it is never shared across frames. Pairs are
/// always resolved sequentially in a deterministic order, so resolving one
/// pair can (intentionally) affect the next.
pub struct World {
    cfg: WorldConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
    groups: Vec<Vec<BodyHandle>>,
    tree: Option<QuadTree>,
}

impl World {
    pub fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            slots: Vec::new(),
            free: Vec::new(),
            groups: Vec::new(),
            tree: None,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.cfg
    }

    // --- Bodies -------------------------------------------------------------

    pub fn add_body(&mut self, owner: OwnerId, position: Vec2, size: Vec2) -> BodyHandle {
        let body = Body::new(owner, position, size);
        let bounds = body.bounds();

        let index = match self.free.pop() {
            Some(i) => {
                self.slots[i as usize].body = Some(body);
                i
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    body: Some(body),
                });
                (self.slots.len() - 1) as u32
            }
        };

        // Keep the new index reachable until the next rebuild.
        if let Some(tree) = &mut self.tree {
            tree.insert(index as usize, bounds);
        }

        BodyHandle {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    /// Remove a body. Stale handles and group memberships are skipped from
    /// here on. Returns false if the handle was already dead.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        match self.index_of(handle) {
            Some(i) => {
                self.slots[i].body = None;
                self.slots[i].generation = self.slots[i].generation.wrapping_add(1);
                self.free.push(i as u32);
                true
            }
            None => false,
        }
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.index_of(handle).and_then(|i| self.slots[i].body.as_ref())
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.index_of(handle).and_then(|i| self.slots[i].body.as_mut())
    }

    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    // --- Groups -------------------------------------------------------------

    pub fn create_group(&mut self) -> GroupId {
        self.groups.push(Vec::new());
        GroupId((self.groups.len() - 1) as u32)
    }

    pub fn group_add(&mut self, group: GroupId, handle: BodyHandle) -> Result<(), CollideError> {
        let members = self
            .groups
            .get_mut(group.0 as usize)
            .ok_or(CollideError::UnknownGroup)?;
        if !members.contains(&handle) {
            members.push(handle);
        }
        Ok(())
    }

    pub fn group_remove(&mut self, group: GroupId, handle: BodyHandle) -> Result<(), CollideError> {
        let members = self
            .groups
            .get_mut(group.0 as usize)
            .ok_or(CollideError::UnknownGroup)?;
        members.retain(|&h| h != handle);
        Ok(())
    }

    pub fn group_members(&self, group: GroupId) -> Result<&[BodyHandle], CollideError> {
        self.groups
            .get(group.0 as usize)
            .map(Vec::as_slice)
            .ok_or(CollideError::UnknownGroup)
    }

    // --- Step ---------------------------------------------------------------

    /// Advance the simulation by `dt` seconds: rotate contact flags,
    /// integrate every enabled body, clamp flagged bodies to the world
    /// bounds, then rebuild the spatial index. `dt <= 0` is a no-op.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let gravity = self.cfg.gravity;
        let bounds = self.cfg.bounds;
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if !body.enable {
                continue;
            }
            body.reset_step_flags();
            body.integrate(gravity, dt);
            if body.collide_world_bounds {
                collide_world_bounds(body, &bounds);
            }
        }

        self.rebuild_tree();
    }

    fn rebuild_tree(&mut self) {
        if self.cfg.bounds.is_degenerate() {
            warn!("degenerate world bounds; broad-phase falling back to linear scan");
            self.tree = None;
            return;
        }
        let mut tree = QuadTree::new(self.cfg.bounds, self.cfg.quadtree);
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(body) = &slot.body {
                if body.enable {
                    tree.insert(i, body.bounds());
                }
            }
        }
        self.tree = Some(tree);
    }

    // --- Collision API ------------------------------------------------------

    /// Test and separate every pair between `source` and `target`.
    ///
    /// `target: None` collides `source` against itself (every pair within
    /// it). Confirmed contacts set `touching` flags, mutate positions and
    /// velocities per the pushable/immovable rules, and invoke `notify`
    /// with the two owner ids. Returns true if any pair collided.
    pub fn collide(
        &mut self,
        source: ColliderRef,
        target: Option<ColliderRef>,
        process: Option<ProcessCallback>,
        notify: Option<NotifyCallback>,
    ) -> Result<bool, CollideError> {
        self.run_pairs(source, target, false, process, notify)
    }

    /// Like [`World::collide`], but only reports: no position or velocity
    /// is changed. `touching` flags are still set.
    pub fn overlap(
        &mut self,
        source: ColliderRef,
        target: Option<ColliderRef>,
        process: Option<ProcessCallback>,
        notify: Option<NotifyCallback>,
    ) -> Result<bool, CollideError> {
        self.run_pairs(source, target, true, process, notify)
    }

    fn run_pairs(
        &mut self,
        source: ColliderRef,
        target: Option<ColliderRef>,
        overlap_only: bool,
        mut process: Option<ProcessCallback>,
        mut notify: Option<NotifyCallback>,
    ) -> Result<bool, CollideError> {
        let mut src = Vec::new();
        self.resolve_ref(source, &mut src)?;
        dedup_in_order(&mut src);
        if src.is_empty() {
            return Err(CollideError::EmptySource);
        }

        let dst = match target {
            None => src.clone(),
            Some(t) => {
                let mut d = Vec::new();
                self.resolve_ref(t, &mut d)?;
                dedup_in_order(&mut d);
                d
            }
        };
        if dst.is_empty() {
            return Ok(false);
        }

        let mut in_target = vec![false; self.slots.len()];
        for &i in &dst {
            in_target[i] = true;
        }

        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut budget = self.cfg.max_pairs_per_call;
        let mut any = false;

        'outer: for &a_idx in &src {
            let Some(a_bounds) = self.slots[a_idx].body.as_ref().map(|b| b.bounds()) else {
                continue;
            };

            let candidates = match &self.tree {
                Some(tree) => {
                    let mut out = Vec::new();
                    tree.retrieve(&a_bounds, &mut out);
                    out.retain(|&i| in_target[i]);
                    out.sort_unstable();
                    out
                }
                None => dst.clone(),
            };

            for b_idx in candidates {
                if b_idx == a_idx {
                    continue;
                }
                let key = if a_idx < b_idx { (a_idx, b_idx) } else { (b_idx, a_idx) };
                if !seen.insert(key) {
                    continue;
                }

                let Some((a, b)) = pair_mut(&mut self.slots, a_idx, b_idx) else {
                    continue;
                };
                if !a.enable || !b.enable {
                    continue;
                }
                if !a.bounds().intersects(&b.bounds()) {
                    continue;
                }
                if let Some(p) = process.as_mut() {
                    if !p(a, b) {
                        continue;
                    }
                }

                if budget == 0 {
                    debug!("pair budget exhausted; dropping remaining candidates");
                    break 'outer;
                }
                budget -= 1;

                let hit = if overlap_only {
                    touch_only(a, b)
                } else {
                    separate(a, b)
                };
                if hit {
                    any = true;
                    let (oa, ob) = (a.owner, b.owner);
                    if let Some(n) = notify.as_mut() {
                        n(oa, ob);
                    }
                }
            }
        }

        Ok(any)
    }

    /// Separate one body against a caller-supplied list of tiles, in list
    /// order. The tilemap layer owns the map; this takes whatever
    /// candidates it produced for the body's bounds.
    pub fn collide_tiles(
        &mut self,
        handle: BodyHandle,
        tiles: &[Tile],
        process: Option<TileProcessCallback>,
        notify: Option<TileNotifyCallback>,
    ) -> Result<bool, CollideError> {
        self.run_tiles(handle, tiles, true, process, notify)
    }

    /// Report-only variant of [`World::collide_tiles`].
    pub fn overlap_tiles(
        &mut self,
        handle: BodyHandle,
        tiles: &[Tile],
        process: Option<TileProcessCallback>,
        notify: Option<TileNotifyCallback>,
    ) -> Result<bool, CollideError> {
        self.run_tiles(handle, tiles, false, process, notify)
    }

    fn run_tiles(
        &mut self,
        handle: BodyHandle,
        tiles: &[Tile],
        resolve: bool,
        mut process: Option<TileProcessCallback>,
        mut notify: Option<TileNotifyCallback>,
    ) -> Result<bool, CollideError> {
        let bias = self.cfg.overlap_bias;
        let body = self.body_mut(handle).ok_or(CollideError::UnknownBody)?;

        let mut any = false;
        for tile in tiles {
            if let Some(p) = process.as_mut() {
                if !p(body, tile) {
                    continue;
                }
            }
            let hit = collide_body_tile(body, tile, bias, resolve);
            if hit.is_contact() {
                any = true;
                let owner = body.owner;
                if let Some(n) = notify.as_mut() {
                    n(owner, tile, hit);
                }
            }
        }
        Ok(any)
    }

    // --- Queries ------------------------------------------------------------

    /// Bodies whose bounds intersect `area`.
    pub fn query_rect(&self, area: &Rect) -> Vec<(BodyHandle, OwnerId)> {
        self.query(area, |body| body.bounds().intersects(area))
    }

    /// Bodies whose bounds contain the point.
    pub fn query_point(&self, p: Vec2) -> Vec<(BodyHandle, OwnerId)> {
        let probe = Rect::new(p.x, p.y, 0.0, 0.0).inflated(0.5);
        self.query(&probe, |body| body.bounds().contains(p))
    }

    /// Bodies whose bounds intersect the circle.
    pub fn query_circle(&self, circle: &Circle) -> Vec<(BodyHandle, OwnerId)> {
        let probe = Rect::from_center(circle.center, Vec2::splat(circle.radius));
        self.query(&probe, |body| circle.intersects_rect(&body.bounds()))
    }

    /// Bodies whose bounds the segment passes through.
    pub fn query_segment(&self, segment: &Segment) -> Vec<(BodyHandle, OwnerId)> {
        let probe = segment.bounds().inflated(0.5);
        self.query(&probe, |body| segment.intersects_rect(&body.bounds()))
    }

    fn query<F>(&self, probe: &Rect, exact: F) -> Vec<(BodyHandle, OwnerId)>
    where
        F: Fn(&Body) -> bool,
    {
        let indices: Vec<usize> = match &self.tree {
            Some(tree) => {
                let mut out = Vec::new();
                tree.retrieve(probe, &mut out);
                out.sort_unstable();
                // A slot reused since the last rebuild can appear under two
                // tree entries; report the body once.
                out.dedup();
                out
            }
            None => (0..self.slots.len()).collect(),
        };

        let mut hits = Vec::new();
        for i in indices {
            let Some(body) = self.slots[i].body.as_ref() else {
                continue;
            };
            if body.enable && exact(body) {
                hits.push((self.handle_at(i), body.owner));
            }
        }
        hits
    }

    /// Distance between two body centers.
    pub fn distance_between(&self, a: BodyHandle, b: BodyHandle) -> Result<f32, CollideError> {
        let a = self.body(a).ok_or(CollideError::UnknownBody)?;
        let b = self.body(b).ok_or(CollideError::UnknownBody)?;
        Ok((b.center() - a.center()).length())
    }

    /// Candidate whose center is nearest `from`'s center.
    pub fn closest(
        &self,
        from: BodyHandle,
        candidates: ColliderRef,
    ) -> Result<Option<BodyHandle>, CollideError> {
        self.extreme_by_distance(from, candidates, |d, best| d < best)
    }

    /// Candidate whose center is furthest from `from`'s center.
    pub fn furthest(
        &self,
        from: BodyHandle,
        candidates: ColliderRef,
    ) -> Result<Option<BodyHandle>, CollideError> {
        self.extreme_by_distance(from, candidates, |d, best| d > best)
    }

    fn extreme_by_distance(
        &self,
        from: BodyHandle,
        candidates: ColliderRef,
        better: impl Fn(f32, f32) -> bool,
    ) -> Result<Option<BodyHandle>, CollideError> {
        let from_idx = self.index_of(from).ok_or(CollideError::UnknownBody)?;
        let center = match self.slots[from_idx].body.as_ref() {
            Some(b) => b.center(),
            None => return Err(CollideError::UnknownBody),
        };

        let mut list = Vec::new();
        self.resolve_ref(candidates, &mut list)?;
        dedup_in_order(&mut list);

        let mut best: Option<(usize, f32)> = None;
        for i in list {
            if i == from_idx {
                continue;
            }
            let Some(body) = self.slots[i].body.as_ref() else {
                continue;
            };
            let d = (body.center() - center).length_squared();
            if best.is_none_or(|(_, bd)| better(d, bd)) {
                best = Some((i, d));
            }
        }
        Ok(best.map(|(i, _)| self.handle_at(i)))
    }

    // --- Internals ----------------------------------------------------------

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        let i = handle.index as usize;
        let slot = self.slots.get(i)?;
        (slot.generation == handle.generation && slot.body.is_some()).then_some(i)
    }

    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Flatten a collider ref into live slot indices, in call order.
    ///
    /// An explicit dangling handle is a caller bug and errors; a group
    /// member that has since been destroyed is normal lifecycle and is
    /// skipped.
    fn resolve_ref(&self, r: ColliderRef, out: &mut Vec<usize>) -> Result<(), CollideError> {
        match r {
            ColliderRef::Body(h) => {
                let i = self.index_of(h).ok_or(CollideError::UnknownBody)?;
                out.push(i);
            }
            ColliderRef::Group(g) => {
                let members = self
                    .groups
                    .get(g.0 as usize)
                    .ok_or(CollideError::UnknownGroup)?;
                for &h in members {
                    if let Some(i) = self.index_of(h) {
                        out.push(i);
                    }
                }
            }
            ColliderRef::List(items) => {
                for &item in items {
                    self.resolve_ref(item, out)?;
                }
            }
        }
        Ok(())
    }
}

/// Distinct mutable borrows of two slots' bodies. None when either slot is
/// empty.
fn pair_mut(slots: &mut [Slot], i: usize, j: usize) -> Option<(&mut Body, &mut Body)> {
    debug_assert_ne!(i, j);
    if i < j {
        let (lo, hi) = slots.split_at_mut(j);
        Some((lo[i].body.as_mut()?, hi[0].body.as_mut()?))
    } else {
        let (lo, hi) = slots.split_at_mut(i);
        let a = hi[0].body.as_mut()?;
        let b = lo[j].body.as_mut()?;
        Some((a, b))
    }
}

fn dedup_in_order(indices: &mut Vec<usize>) {
    let mut seen = HashSet::new();
    indices.retain(|&i| seen.insert(i));
}

/// Clamp a flagged body inside the world rect, reflecting velocity through
/// its bounce and pinning the blocked edge.
fn collide_world_bounds(body: &mut Body, bounds: &Rect) {
    if bounds.is_degenerate() {
        return;
    }

    if body.left() < bounds.left() && body.check_collision.left {
        body.position.x = bounds.left();
        body.velocity.x = -body.velocity.x * body.bounce.x;
        body.blocked.left = true;
    } else if body.right() > bounds.right() && body.check_collision.right {
        body.position.x = bounds.right() - body.size.x;
        body.velocity.x = -body.velocity.x * body.bounce.x;
        body.blocked.right = true;
    }

    if body.top() < bounds.top() && body.check_collision.up {
        body.position.y = bounds.top();
        body.velocity.y = -body.velocity.y * body.bounce.y;
        body.blocked.up = true;
    } else if body.bottom() > bounds.bottom() && body.check_collision.down {
        body.position.y = bounds.bottom() - body.size.y;
        body.velocity.y = -body.velocity.y * body.bounce.y;
        body.blocked.down = true;
    }

    body.sync_bounds();
}
