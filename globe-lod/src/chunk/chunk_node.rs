use std::collections::VecDeque;

use globe_scene::{Geodetic2, Quad, TileIndex};

use super::Chunk;
use crate::render_data::RenderData;

/// Decisions the tree asks for while it updates itself.
pub trait ChunkSelector {
    /// Called once per visit before any decision is made.
    fn refresh(&self, _chunk: &mut Chunk) {}
    fn is_cullable(&self, chunk: &Chunk, data: &RenderData) -> bool;
    fn desired_level(&self, chunk: &Chunk, data: &RenderData) -> i32;
    fn max_split_depth(&self) -> u32;
}

/// Quadtree node. Either a leaf that renders its own chunk, or split into exactly
/// four children in `Quad` order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkNode {
    chunk: Chunk,
    children: Option<Box<[ChunkNode; 4]>>,
}
impl ChunkNode {
    pub fn new(tile_index: TileIndex) -> Self {
        Self {
            chunk: Chunk::new(tile_index),
            children: None,
        }
    }
    pub fn chunk(&self) -> &Chunk {
        return &self.chunk;
    }
    pub fn level(&self) -> u32 {
        return self.chunk.level();
    }
    pub fn is_leaf(&self) -> bool {
        return self.children.is_none();
    }
    pub fn children(&self) -> Option<&[ChunkNode; 4]> {
        return self.children.as_deref();
    }
    pub fn child(&self, quad: Quad) -> Option<&ChunkNode> {
        return self.children().map(|children| &children[quad as usize]);
    }
    /// Splits `depth` levels below this node, keeping existing children.
    pub fn split(&mut self, depth: u32) {
        if depth == 0 {
            return;
        }
        let index = self.chunk.tile_index();
        let children = self
            .children
            .get_or_insert_with(|| Box::new(index.children().map(ChunkNode::new)));
        for child in children.iter_mut() {
            child.split(depth - 1);
        }
    }
    pub fn merge(&mut self) {
        self.children = None;
    }
    pub fn update_chunk_tree(&mut self, data: &RenderData, selector: &dyn ChunkSelector) {
        selector.refresh(&mut self.chunk);
        if selector.is_cullable(&self.chunk, data) {
            self.merge();
            self.chunk.set_visible(false);
            return;
        }
        let desired_level = selector.desired_level(&self.chunk, data);
        let level = self.level();
        if desired_level > level as i32 && level < selector.max_split_depth() {
            self.split(1);
            self.chunk.set_visible(false);
            if let Some(children) = self.children.as_mut() {
                for child in children.iter_mut() {
                    child.update_chunk_tree(data, selector);
                }
            }
        } else {
            self.merge();
            self.chunk.set_visible(true);
        }
    }
    /// Leaf below this node whose patch holds `point`. The point has to lie
    /// inside this node's patch.
    pub fn find(&self, point: Geodetic2) -> &ChunkNode {
        let mut node = self;
        while let Some(children) = node.children.as_deref() {
            let center = node.chunk.surface_patch().center();
            let east = point.lon >= center.lon;
            let north = point.lat > center.lat;
            let quad = match (north, east) {
                (true, false) => Quad::NorthWest,
                (true, true) => Quad::NorthEast,
                (false, false) => Quad::SouthWest,
                (false, true) => Quad::SouthEast,
            };
            node = &children[quad as usize];
        }
        return node;
    }
    /// Visits nodes level by level, parents before children.
    pub fn breadth_first<F: FnMut(&ChunkNode)>(&self, mut visit: F) {
        let mut queue: VecDeque<&ChunkNode> = VecDeque::new();
        queue.push_back(self);
        while let Some(node) = queue.pop_front() {
            visit(node);
            if let Some(children) = node.children.as_deref() {
                queue.extend(children.iter());
            }
        }
    }
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.breadth_first(|_| count += 1);
        return count;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use rand::Rng;

    use super::*;

    struct FixedLevel {
        desired: i32,
        max_split_depth: u32,
    }
    impl ChunkSelector for FixedLevel {
        fn is_cullable(&self, _chunk: &Chunk, _data: &RenderData) -> bool {
            false
        }
        fn desired_level(&self, _chunk: &Chunk, _data: &RenderData) -> i32 {
            self.desired
        }
        fn max_split_depth(&self) -> u32 {
            self.max_split_depth
        }
    }

    /// Refines only around `points`, and culls what lies west of `cull_west_of`.
    struct AroundPoints {
        points: Vec<Geodetic2>,
        level: i32,
        cull_west_of: f64,
    }
    impl ChunkSelector for AroundPoints {
        fn is_cullable(&self, chunk: &Chunk, _data: &RenderData) -> bool {
            chunk.surface_patch().max_lon() < self.cull_west_of
        }
        fn desired_level(&self, chunk: &Chunk, _data: &RenderData) -> i32 {
            let patch = chunk.surface_patch();
            if self.points.iter().any(|p| patch.contains(*p)) {
                self.level
            } else {
                2
            }
        }
        fn max_split_depth(&self) -> u32 {
            22
        }
    }

    fn check_invariants(root: &ChunkNode) {
        root.breadth_first(|node| {
            if let Some(children) = node.children() {
                assert!(!node.chunk().is_visible(), "split node is visible");
                for (i, child) in children.iter().enumerate() {
                    assert_eq!(child.level(), node.level() + 1);
                    assert_eq!(
                        child.chunk().tile_index(),
                        node.chunk().tile_index().child(Quad::from_index(i))
                    );
                }
            }
        });
    }

    #[test]
    fn splits_to_desired_level() {
        let mut root = ChunkNode::new(TileIndex::EAST_ROOT);
        let selector = FixedLevel {
            desired: 3,
            max_split_depth: 22,
        };
        root.update_chunk_tree(&RenderData::default(), &selector);
        check_invariants(&root);
        let mut leaves = 0;
        root.breadth_first(|node| {
            if node.is_leaf() {
                leaves += 1;
                assert_eq!(node.level(), 3);
                assert!(node.chunk().is_visible());
            }
        });
        assert_eq!(leaves, 16);
        assert_eq!(root.node_count(), 1 + 4 + 16);
    }
    #[test]
    fn respects_max_split_depth() {
        let mut root = ChunkNode::new(TileIndex::WEST_ROOT);
        let selector = FixedLevel {
            desired: 100,
            max_split_depth: 4,
        };
        root.update_chunk_tree(&RenderData::default(), &selector);
        root.breadth_first(|node| assert!(node.level() <= 4));
        assert_eq!(root.find(Geodetic2::new(0.0, -1.0)).level(), 4);
    }
    #[test]
    fn split_then_merge_restores_leaf() {
        let mut root = ChunkNode::new(TileIndex::EAST_ROOT);
        let data = RenderData::default();
        root.update_chunk_tree(
            &data,
            &FixedLevel {
                desired: 5,
                max_split_depth: 22,
            },
        );
        assert!(!root.is_leaf());
        root.update_chunk_tree(
            &data,
            &FixedLevel {
                desired: 1,
                max_split_depth: 22,
            },
        );
        assert!(root.is_leaf());
        assert!(root.children().is_none());
        assert!(root.chunk().is_visible());
        assert_eq!(root.node_count(), 1);
    }
    #[test]
    fn culled_subtree_is_collapsed() {
        let mut root = ChunkNode::new(TileIndex::WEST_ROOT);
        let data = RenderData::default();
        let mut selector = AroundPoints {
            points: vec![Geodetic2::new(0.2, -0.3)],
            level: 8,
            cull_west_of: -PI,
        };
        root.update_chunk_tree(&data, &selector);
        assert!(root.node_count() > 21);
        // everything of the west hemisphere lies west of longitude 0.1
        selector.cull_west_of = 0.1;
        root.update_chunk_tree(&data, &selector);
        assert!(root.is_leaf());
        assert!(!root.chunk().is_visible());
    }
    #[test]
    fn find_lands_in_containing_leaf() {
        let mut rng = rand::thread_rng();
        let random_point = |rng: &mut rand::rngs::ThreadRng, min_lon: f64, max_lon: f64| {
            Geodetic2::new(
                rng.gen_range(-FRAC_PI_2..=FRAC_PI_2),
                rng.gen_range(min_lon..max_lon),
            )
        };
        for (root_index, min_lon, max_lon) in [
            (TileIndex::WEST_ROOT, -PI, 0.0),
            (TileIndex::EAST_ROOT, 0.0, PI),
        ] {
            let points: Vec<Geodetic2> = (0..20)
                .map(|_| random_point(&mut rng, min_lon, max_lon))
                .collect();
            let mut root = ChunkNode::new(root_index);
            root.update_chunk_tree(
                &RenderData::default(),
                &AroundPoints {
                    points,
                    level: rng.gen_range(3..14),
                    cull_west_of: -PI,
                },
            );
            check_invariants(&root);
            for _ in 0..500 {
                let p = random_point(&mut rng, min_lon, max_lon);
                let leaf = root.find(p);
                assert!(leaf.is_leaf());
                let patch = leaf.chunk().surface_patch();
                assert!(
                    patch.contains(p) || patch.closest_point(p).equals_epsilon(&p, 1e-12),
                    "{} does not hold {:?}",
                    leaf.chunk().tile_index(),
                    p
                );
            }
            // the shared edges are claimed deterministically
            let edge = root.find(Geodetic2::new(0.0, (min_lon + max_lon) / 2.0));
            assert!(edge.chunk().surface_patch().contains(Geodetic2::new(0.0, (min_lon + max_lon) / 2.0)));
        }
    }
    #[test]
    fn breadth_first_goes_level_by_level() {
        let mut root = ChunkNode::new(TileIndex::EAST_ROOT);
        root.split(3);
        let mut last_level = 0;
        let mut count = 0;
        root.breadth_first(|node| {
            assert!(node.level() >= last_level);
            last_level = node.level();
            count += 1;
        });
        assert_eq!(count, 1 + 4 + 16 + 64);
        assert_eq!(last_level, 4);
    }
}
