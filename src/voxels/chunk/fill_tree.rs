//! # Fill-State Tree
//!
//! A sparse occupancy summary for one chunk: per vertical 32-unit slab, an
//! octree whose nodes mark a cuboid region as fully empty, fully solid, or
//! mixed. The mesher walks this tree to emit one merged cuboid per FULL
//! region instead of testing faces per voxel, and `fill` short-circuits as
//! soon as a region is already known solid.
//!
//! ## Structure
//!
//! The chunk root is not a single tree but `NUM_SLABS` independent octrees,
//! one per horizontal slab of the column. This bounds tree depth at
//! `log2(CHUNK_SIZE)` and lets whole-slab fullness short-circuit meshing
//! with a single state check.
//!
//! Nodes are allocated from a bump arena and addressed by index; they are
//! never individually freed; the whole arena goes away with the chunk. A
//! node whose state is FULL or EMPTY has all children pruned; a PARTIAL node
//! always has at least one child.

use cgmath::Point3;
use log::debug;

use crate::voxels::block::block_side::Octant;

use super::{CHUNK_MAX_HEIGHT, CHUNK_SIZE};

/// The number of independent slab octrees in one tree (one per 32-unit-tall
/// horizontal slab of the chunk column).
pub const NUM_SLABS: usize = (CHUNK_MAX_HEIGHT / CHUNK_SIZE) as usize;

/// Deepest possible descent: halving from `CHUNK_SIZE` down to a unit cube.
const MAX_FILL_DEPTH: usize = CHUNK_SIZE.trailing_zeros() as usize + 1;

/// Nodes the arena reserves up front. The arena grows beyond this on demand;
/// the worst case (every voxel individually subdivided) is never reached by
/// real terrain.
const ARENA_INITIAL_CAPACITY: usize = 1024;

/// Index of a node within a tree's arena.
pub type NodeIndex = u32;

/// The occupancy summary of a cuboid region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FillState {
    /// No voxel in the region is occupied.
    EMPTY,
    /// Some but not all voxels in the region are occupied.
    PARTIAL,
    /// Every voxel in the region is occupied.
    FULL,
}

/// One octree node: an axis-aligned cube region and its fill state.
#[derive(Copy, Clone, Debug)]
pub struct FillNode {
    /// Minimum corner of the region in chunk-local coordinates (z ≤ 0 per
    /// the depth convention).
    pub origin: Point3<i32>,
    /// Edge length; a power of two descending from `CHUNK_SIZE` to 1.
    pub size: i32,
    /// The region's occupancy summary.
    pub state: FillState,
    /// Child node indices, one per [`Octant`] code. All `None` unless the
    /// node is PARTIAL.
    pub children: [Option<NodeIndex>; 8],
}

/// A per-chunk fill-state tree: `NUM_SLABS` slab octrees over one arena.
pub struct FillTree {
    arena: Vec<FillNode>,
    roots: [NodeIndex; NUM_SLABS],
}

impl FillTree {
    /// Creates a tree with every slab root EMPTY.
    pub fn new() -> Self {
        let mut arena = Vec::with_capacity(ARENA_INITIAL_CAPACITY);
        let mut roots = [0; NUM_SLABS];
        for (slab, root) in roots.iter_mut().enumerate() {
            *root = arena.len() as NodeIndex;
            arena.push(FillNode {
                origin: Point3::new(0, slab as i32 * CHUNK_SIZE, 0),
                size: CHUNK_SIZE,
                state: FillState::EMPTY,
                children: [None; 8],
            });
        }
        FillTree { arena, roots }
    }

    /// The root node of the given slab.
    pub fn slab_root(&self, slab: usize) -> &FillNode {
        &self.arena[self.roots[slab] as usize]
    }

    /// The node at the given arena index.
    pub fn node(&self, index: NodeIndex) -> &FillNode {
        &self.arena[index as usize]
    }

    /// Total nodes allocated so far (roots included).
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    fn alloc(&mut self, node: FillNode) -> NodeIndex {
        let index = self.arena.len() as NodeIndex;
        self.arena.push(node);
        index
    }

    /// Marks the unit voxel at `coord` as occupied.
    ///
    /// Descends from the slab root, halving the region and following the
    /// octant containing `coord`, allocating missing children along the way;
    /// a region already FULL stops the descent immediately. A newly
    /// allocated unit node is FULL on arrival. Every visited ancestor is
    /// then re-aggregated deepest-first: a PARTIAL node whose eight children
    /// are all FULL becomes FULL and prunes them, and an EMPTY node that
    /// gained its first child becomes PARTIAL.
    ///
    /// Filling an already-filled voxel is a no-op in every observable way.
    pub fn fill(&mut self, coord: Point3<i32>) {
        debug_assert!(coord.y >= 0 && coord.y < CHUNK_MAX_HEIGHT && coord.z <= 0);
        let slab = (coord.y / CHUNK_SIZE) as usize;
        let mut visited: Vec<NodeIndex> = Vec::with_capacity(MAX_FILL_DEPTH);
        let mut current = self.roots[slab];

        loop {
            let FillNode { origin, size, state, .. } = self.arena[current as usize];
            if state == FillState::FULL {
                break;
            }
            if size == 1 {
                self.arena[current as usize].state = FillState::FULL;
                break;
            }

            let octant = Octant::containing(origin, size, coord);
            let child = match self.arena[current as usize].children[octant as usize] {
                Some(child) => child,
                None => {
                    let child_origin = octant.child_origin(origin, size);
                    let child_size = size / 2;
                    let child_state = if child_size == 1 {
                        debug_assert_eq!(child_origin, coord);
                        FillState::FULL
                    } else {
                        FillState::EMPTY
                    };
                    let child = self.alloc(FillNode {
                        origin: child_origin,
                        size: child_size,
                        state: child_state,
                        children: [None; 8],
                    });
                    self.arena[current as usize].children[octant as usize] = Some(child);
                    child
                }
            };

            visited.push(current);
            current = child;
        }

        for &ancestor in visited.iter().rev() {
            self.aggregate(ancestor);
        }
    }

    /// Re-derives one node's state from its children, pruning on promotion
    /// to FULL.
    fn aggregate(&mut self, index: NodeIndex) {
        let children = self.arena[index as usize].children;
        let mut any_child = false;
        let mut all_full = true;
        for child in children {
            match child {
                Some(child) => {
                    any_child = true;
                    if self.arena[child as usize].state != FillState::FULL {
                        all_full = false;
                    }
                }
                None => all_full = false,
            }
        }

        let node = &mut self.arena[index as usize];
        if any_child && all_full {
            node.state = FillState::FULL;
            // The region is now an opaque solid leaf; the children carry no
            // further information.
            node.children = [None; 8];
            if node.size == CHUNK_SIZE {
                debug!("slab at y={} aggregated to FULL", node.origin.y);
            }
        } else if any_child {
            node.state = FillState::PARTIAL;
        }
        debug_assert!(
            node.state != FillState::PARTIAL || any_child,
            "PARTIAL node with no children at {:?}",
            node.origin
        );
    }

    /// Un-marks the unit voxel at `coord`.
    ///
    /// The inverse of [`fill`](Self::fill): descending through a FULL region
    /// first re-expands it into eight FULL children (the occupancy store
    /// retains per-voxel types, so no information is lost by the earlier
    /// pruning), then the unit leaf becomes EMPTY and is pruned from its
    /// parent. Ancestors re-derive their state on the way back up: a node
    /// left with no children becomes EMPTY, otherwise PARTIAL.
    ///
    /// Clearing a voxel that was never filled is a no-op.
    pub fn clear(&mut self, coord: Point3<i32>) {
        debug_assert!(coord.y >= 0 && coord.y < CHUNK_MAX_HEIGHT && coord.z <= 0);
        let slab = (coord.y / CHUNK_SIZE) as usize;
        let mut visited: Vec<(NodeIndex, usize)> = Vec::with_capacity(MAX_FILL_DEPTH);
        let mut current = self.roots[slab];

        loop {
            let FillNode { origin, size, state, .. } = self.arena[current as usize];
            if state == FillState::EMPTY {
                return;
            }
            if size == 1 {
                self.arena[current as usize].state = FillState::EMPTY;
                break;
            }
            if state == FillState::FULL {
                self.expand(current);
            }

            let octant = Octant::containing(origin, size, coord);
            match self.arena[current as usize].children[octant as usize] {
                Some(child) => {
                    visited.push((current, octant as usize));
                    current = child;
                }
                // A PARTIAL node with no child in this octant: the voxel was
                // never filled.
                None => return,
            }
        }

        let mut prune_child = true;
        for &(ancestor, slot) in visited.iter().rev() {
            if prune_child {
                self.arena[ancestor as usize].children[slot] = None;
            }
            let any_child = self.arena[ancestor as usize]
                .children
                .iter()
                .any(Option::is_some);
            let node = &mut self.arena[ancestor as usize];
            if any_child {
                node.state = FillState::PARTIAL;
                prune_child = false;
            } else {
                node.state = FillState::EMPTY;
                node.children = [None; 8];
                prune_child = true;
            }
        }
    }

    /// Splits a FULL node into eight FULL children and marks it PARTIAL.
    fn expand(&mut self, index: NodeIndex) {
        let FillNode { origin, size, .. } = self.arena[index as usize];
        debug_assert!(size > 1);
        for code in 0..8u8 {
            let octant = Octant::from_code(code);
            let child = self.alloc(FillNode {
                origin: octant.child_origin(origin, size),
                size: size / 2,
                state: FillState::FULL,
                children: [None; 8],
            });
            self.arena[index as usize].children[code as usize] = Some(child);
        }
        self.arena[index as usize].state = FillState::PARTIAL;
    }

    /// Whether the tree currently marks the unit voxel at `coord` occupied.
    pub fn is_filled(&self, coord: Point3<i32>) -> bool {
        if coord.y < 0 || coord.y >= CHUNK_MAX_HEIGHT {
            return false;
        }
        let slab = (coord.y / CHUNK_SIZE) as usize;
        let mut current = self.roots[slab];
        loop {
            let node = &self.arena[current as usize];
            match node.state {
                FillState::FULL => return true,
                FillState::EMPTY => return false,
                FillState::PARTIAL => {
                    let octant = Octant::containing(node.origin, node.size, coord);
                    match node.children[octant as usize] {
                        Some(child) => current = child,
                        None => return false,
                    }
                }
            }
        }
    }
}

impl Default for FillTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_empty_slab_roots() {
        let tree = FillTree::new();
        assert_eq!(tree.node_count(), NUM_SLABS);
        for slab in 0..NUM_SLABS {
            let root = tree.slab_root(slab);
            assert_eq!(root.state, FillState::EMPTY);
            assert_eq!(root.size, CHUNK_SIZE);
            assert_eq!(root.origin.y, slab as i32 * CHUNK_SIZE);
        }
    }

    #[test]
    fn test_fill_marks_voxel_and_ancestors() {
        let mut tree = FillTree::new();
        tree.fill(Point3::new(5, 70, -9));
        assert!(tree.is_filled(Point3::new(5, 70, -9)));
        assert!(!tree.is_filled(Point3::new(5, 71, -9)));
        assert_eq!(tree.slab_root(2).state, FillState::PARTIAL);
        // One root-to-leaf path: 16, 8, 4, 2, 1.
        assert_eq!(tree.node_count(), NUM_SLABS + 5);
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut tree = FillTree::new();
        tree.fill(Point3::new(3, 3, -3));
        let nodes_after_first = tree.node_count();
        let root_state = tree.slab_root(0).state;
        tree.fill(Point3::new(3, 3, -3));
        assert_eq!(tree.node_count(), nodes_after_first);
        assert_eq!(tree.slab_root(0).state, root_state);
        assert!(tree.is_filled(Point3::new(3, 3, -3)));
    }

    #[test]
    fn test_deepest_octant_group_aggregates_and_prunes() {
        let mut tree = FillTree::new();
        // Fill a complete 2×2×2 group at the deepest level.
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    tree.fill(Point3::new(x, y, -z));
                }
            }
        }
        // Walk down to the size-2 node covering the group.
        let mut node = tree.slab_root(0);
        while node.size > 2 {
            assert_eq!(node.state, FillState::PARTIAL);
            let octant = Octant::containing(node.origin, node.size, Point3::new(0, 0, 0));
            node = tree.node(node.children[octant as usize].expect("path to group exists"));
        }
        assert_eq!(node.state, FillState::FULL);
        assert!(node.children.iter().all(Option::is_none), "FULL node must prune");
    }

    #[test]
    fn test_filling_entire_slab_aggregates_root_to_full() {
        let mut tree = FillTree::new();
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    tree.fill(Point3::new(x, y, -z));
                }
            }
        }
        let root = tree.slab_root(0);
        assert_eq!(root.state, FillState::FULL);
        assert!(root.children.iter().all(Option::is_none));
        // Filling into a FULL slab is a short-circuit no-op.
        let nodes = tree.node_count();
        tree.fill(Point3::new(7, 7, -7));
        assert_eq!(tree.node_count(), nodes);
    }

    #[test]
    fn test_clear_unfills_a_single_voxel() {
        let mut tree = FillTree::new();
        tree.fill(Point3::new(4, 4, -4));
        tree.fill(Point3::new(10, 4, -4));
        tree.clear(Point3::new(4, 4, -4));
        assert!(!tree.is_filled(Point3::new(4, 4, -4)));
        assert!(tree.is_filled(Point3::new(10, 4, -4)));
        assert_eq!(tree.slab_root(0).state, FillState::PARTIAL);
    }

    #[test]
    fn test_clear_last_voxel_returns_tree_to_empty() {
        let mut tree = FillTree::new();
        tree.fill(Point3::new(12, 40, -3));
        tree.clear(Point3::new(12, 40, -3));
        assert!(!tree.is_filled(Point3::new(12, 40, -3)));
        assert_eq!(tree.slab_root(1).state, FillState::EMPTY);
        assert!(tree.slab_root(1).children.iter().all(Option::is_none));
    }

    #[test]
    fn test_clear_re_expands_full_regions() {
        let mut tree = FillTree::new();
        // Build a FULL 2×2×2 group, then remove one voxel from it.
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    tree.fill(Point3::new(x, y, -z));
                }
            }
        }
        tree.clear(Point3::new(0, 0, 0));
        assert!(!tree.is_filled(Point3::new(0, 0, 0)));
        // The other seven survive the re-expansion.
        for (x, y, z) in [(1, 0, 0), (0, 1, 0), (0, 0, 1), (1, 1, 1)] {
            assert!(tree.is_filled(Point3::new(x, y, -z)), "({}, {}, -{})", x, y, z);
        }
    }

    #[test]
    fn test_clear_never_filled_voxel_is_noop() {
        let mut tree = FillTree::new();
        tree.fill(Point3::new(8, 8, -8));
        let nodes = tree.node_count();
        tree.clear(Point3::new(20, 8, -8));
        assert_eq!(tree.node_count(), nodes);
        assert!(tree.is_filled(Point3::new(8, 8, -8)));
    }
}
