use crate::math::Rect;

/// Tunables for the spatial index.
///
/// `max_objects` is the per-node count that triggers a split; `max_depth`
/// bounds recursion. Small worlds with big bodies want small values, dense
/// bullet-hell scenes want bigger ones.
#[derive(Copy, Clone, Debug)]
pub struct QuadTreeConfig {
    pub max_objects: usize,
    pub max_depth: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_objects: 4,
            max_depth: 4,
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    index: usize,
    bounds: Rect,
}

/// Recursive 4-way spatial partition over body indices.
///
/// Rebuilt from scratch every tick; it is a throwaway acceleration
/// structure, not a source of truth. An entry that straddles a split
/// boundary stays at the parent level and is never duplicated into
/// children, so retrieval cannot double-count.
#[derive(Debug)]
pub struct QuadTree {
    bounds: Rect,
    depth: usize,
    cfg: QuadTreeConfig,
    entries: Vec<Entry>,
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    pub fn new(bounds: Rect, cfg: QuadTreeConfig) -> Self {
        Self {
            bounds,
            depth: 0,
            cfg,
            entries: Vec::new(),
            children: None,
        }
    }

    fn child(bounds: Rect, depth: usize, cfg: QuadTreeConfig) -> Self {
        Self {
            bounds,
            depth,
            cfg,
            entries: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Total entries stored in this node and all descendants.
    pub fn len(&self) -> usize {
        let mut n = self.entries.len();
        if let Some(children) = &self.children {
            for c in children.iter() {
                n += c.len();
            }
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.children = None;
    }

    /// Insert a body index with its bounds.
    ///
    /// Degenerate tree bounds make the node unsplittable, so everything
    /// lands in this single bucket and retrieval degrades to a linear scan.
    pub fn insert(&mut self, index: usize, bounds: Rect) {
        if let Some(children) = &mut self.children {
            if let Some(quadrant) = fit_quadrant(children, &bounds) {
                children[quadrant].insert(index, bounds);
                return;
            }
            // Straddles a split boundary: keep it here.
            self.entries.push(Entry { index, bounds });
            return;
        }

        self.entries.push(Entry { index, bounds });

        if self.entries.len() > self.cfg.max_objects
            && self.depth < self.cfg.max_depth
            && !self.bounds.is_degenerate()
        {
            self.subdivide();
        }
    }

    fn subdivide(&mut self) {
        let half = self.bounds.half_extents();
        let x = self.bounds.x;
        let y = self.bounds.y;
        let depth = self.depth + 1;
        let cfg = self.cfg;

        let mut children = Box::new([
            QuadTree::child(Rect::new(x, y, half.x, half.y), depth, cfg),
            QuadTree::child(Rect::new(x + half.x, y, half.x, half.y), depth, cfg),
            QuadTree::child(Rect::new(x, y + half.y, half.x, half.y), depth, cfg),
            QuadTree::child(Rect::new(x + half.x, y + half.y, half.x, half.y), depth, cfg),
        ]);

        let mut retained = Vec::new();
        for entry in self.entries.drain(..) {
            match fit_quadrant(&children, &entry.bounds) {
                Some(q) => children[q].insert(entry.index, entry.bounds),
                None => retained.push(entry),
            }
        }
        self.entries = retained;
        self.children = Some(children);
    }

    /// Collect every stored index whose node could hold something that
    /// intersects `target`, including entries held at ancestor levels.
    ///
    /// The result is a superset of the true intersection set; callers run
    /// their own exact bounds check on the candidates.
    pub fn retrieve(&self, target: &Rect, out: &mut Vec<usize>) {
        for entry in &self.entries {
            if entry.bounds.intersects(target) {
                out.push(entry.index);
            }
        }
        if let Some(children) = &self.children {
            for c in children.iter() {
                if c.bounds.intersects(target) || c.bounds.is_degenerate() {
                    c.retrieve(target, out);
                }
            }
        }
    }
}

fn fit_quadrant(children: &[QuadTree; 4], bounds: &Rect) -> Option<usize> {
    children
        .iter()
        .position(|c| c.bounds.contains_rect(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    fn unit(x: f32, y: f32) -> Rect {
        Rect::new(x, y, 2.0, 2.0)
    }

    /// Small deterministic LCG so the completeness sweep needs no RNG crate.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self, max: f32) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((self.0 >> 33) as f32 / (1u64 << 31) as f32) * max
        }
    }

    #[test]
    fn splits_after_threshold() {
        let mut tree = QuadTree::new(world(), QuadTreeConfig::default());
        for i in 0..4 {
            tree.insert(i, unit(5.0 + i as f32, 5.0));
        }
        assert!(tree.children.is_none());
        tree.insert(4, unit(80.0, 80.0));
        assert!(tree.children.is_some());
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn straddlers_stay_at_parent() {
        let mut tree = QuadTree::new(world(), QuadTreeConfig::default());
        for i in 0..8 {
            tree.insert(i, unit(5.0 + i as f32, 5.0));
        }
        // Crosses the vertical midline at x=50
        tree.insert(100, Rect::new(48.0, 10.0, 6.0, 6.0));
        assert!(tree.children.is_some());
        assert!(tree.entries.iter().any(|e| e.index == 100));

        let mut out = Vec::new();
        tree.retrieve(&Rect::new(47.0, 9.0, 2.0, 2.0), &mut out);
        assert_eq!(out.iter().filter(|&&i| i == 100).count(), 1);
    }

    #[test]
    fn max_depth_is_honored() {
        let cfg = QuadTreeConfig {
            max_objects: 1,
            max_depth: 2,
        };
        let mut tree = QuadTree::new(world(), cfg);
        // Pile everything into one corner so every level wants to split.
        for i in 0..32 {
            tree.insert(i, unit(1.0 + (i % 4) as f32 * 0.1, 1.0));
        }

        fn depth_of(t: &QuadTree) -> usize {
            match &t.children {
                None => t.depth,
                Some(cs) => cs.iter().map(depth_of).max().unwrap(),
            }
        }
        assert!(depth_of(&tree) <= 2);
        assert_eq!(tree.len(), 32);
    }

    #[test]
    fn degenerate_bounds_fall_back_to_single_bucket() {
        let mut tree = QuadTree::new(Rect::new(0.0, 0.0, 0.0, 0.0), QuadTreeConfig::default());
        for i in 0..20 {
            tree.insert(i, unit(i as f32, i as f32));
        }
        assert!(tree.children.is_none());

        let mut out = Vec::new();
        tree.retrieve(&unit(5.0, 5.0), &mut out);
        assert!(out.contains(&5));
    }

    #[test]
    fn retrieval_matches_brute_force() {
        let mut rng = Lcg(0x5eed);
        let cfg = QuadTreeConfig::default();

        for round in 0..8 {
            let mut tree = QuadTree::new(world(), cfg);
            let mut rects = Vec::new();
            for i in 0..120 {
                let r = Rect::new(
                    rng.next_f32(95.0),
                    rng.next_f32(95.0),
                    0.5 + rng.next_f32(8.0),
                    0.5 + rng.next_f32(8.0),
                );
                tree.insert(i, r);
                rects.push(r);
            }

            let query = Rect::new(
                rng.next_f32(80.0),
                rng.next_f32(80.0),
                5.0 + rng.next_f32(20.0),
                5.0 + rng.next_f32(20.0),
            );

            let mut candidates = Vec::new();
            tree.retrieve(&query, &mut candidates);

            for (i, r) in rects.iter().enumerate() {
                if r.intersects(&query) {
                    assert!(
                        candidates.contains(&i),
                        "round {round}: body {i} missed by retrieval"
                    );
                }
            }
            // No duplicates either.
            let mut sorted = candidates.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), candidates.len());
        }
    }
}
