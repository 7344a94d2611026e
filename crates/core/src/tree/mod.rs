//! Range tree of HNSW graphs.
//!
//! A complete binary tree over the attribute-sorted order. A node covers the
//! half-open position interval `[lo, hi)`; internal nodes split at
//! `mid = (lo + hi) / 2` and leaves cover a single position. Every node owns
//! an HNSW graph over exactly the ids in its interval, so an id belongs to
//! its leaf's graph and to every ancestor's graph.
//!
//! Nodes live in a flat arena and address children by index — no pointer
//! cycles, and the builder can hand out `&HnswGraph` references freely.

/// Parallel population of the per-node graphs.
pub mod build;

use crate::hnsw::{GraphParams, HnswGraph};
use crate::store::{AttributeIndex, VectorStore};
use std::sync::Arc;

/// One node of the range tree.
#[derive(Debug)]
pub struct TreeNode {
    /// Inclusive lower position bound.
    pub lo: usize,
    /// Exclusive upper position bound.
    pub hi: usize,
    /// Left child (`[lo, mid)`), `None` for leaves.
    pub left: Option<u32>,
    /// Right child (`[mid, hi)`), `None` for leaves.
    pub right: Option<u32>,
    /// Proximity graph over the ids at positions `lo..hi`.
    pub graph: HnswGraph,
}

impl TreeNode {
    /// Number of elements this node covers.
    #[inline]
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Returns `true` for the degenerate zero-width node (never built).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }
}

/// The complete tree. `N` leaves, `2N - 1` nodes, depth `ceil(log2 N)`.
#[derive(Debug)]
pub struct RangeTree {
    nodes: Vec<TreeNode>,
    root: u32,
}

impl RangeTree {
    /// Build the topology over the full sorted order. Graphs are allocated
    /// empty here and populated by [`build::populate`].
    pub fn new(store: Arc<VectorStore>, attrs: &AttributeIndex, params: GraphParams) -> Self {
        debug_assert!(!attrs.is_empty());
        let n = attrs.len();
        let mut nodes = Vec::with_capacity(2 * n - 1);
        let root = Self::alloc(&mut nodes, &store, attrs, params, 0, n);
        Self { nodes, root }
    }

    fn alloc(
        nodes: &mut Vec<TreeNode>,
        store: &Arc<VectorStore>,
        attrs: &AttributeIndex,
        params: GraphParams,
        lo: usize,
        hi: usize,
    ) -> u32 {
        let (left, right) = if hi - lo > 1 {
            let mid = (lo + hi) / 2;
            (
                Some(Self::alloc(nodes, store, attrs, params, lo, mid)),
                Some(Self::alloc(nodes, store, attrs, params, mid, hi)),
            )
        } else {
            (None, None)
        };
        let ids = attrs.order()[lo..hi].to_vec();
        nodes.push(TreeNode {
            lo,
            hi,
            left,
            right,
            graph: HnswGraph::new(Arc::clone(store), ids, params),
        });
        (nodes.len() - 1) as u32
    }

    /// Total number of tree nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node by arena index.
    #[inline]
    pub fn node(&self, idx: u32) -> &TreeNode {
        &self.nodes[idx as usize]
    }

    /// The root node, covering every position.
    #[inline]
    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root as usize]
    }

    /// Minimal cover of the position interval `[lo, hi)`: the standard
    /// segment-tree decomposition, at most `2 * ceil(log2 N)` nodes, whose
    /// intervals are disjoint and union to `[lo, hi)`.
    pub fn cover(&self, lo: usize, hi: usize) -> Vec<u32> {
        let mut out = Vec::new();
        if lo < hi {
            self.cover_rec(self.root, lo, hi, &mut out);
        }
        out
    }

    fn cover_rec(&self, idx: u32, lo: usize, hi: usize, out: &mut Vec<u32>) {
        let node = &self.nodes[idx as usize];
        if hi <= node.lo || node.hi <= lo {
            return;
        }
        if lo <= node.lo && node.hi <= hi {
            out.push(idx);
            return;
        }
        if let Some(left) = node.left {
            self.cover_rec(left, lo, hi, out);
        }
        if let Some(right) = node.right {
            self.cover_rec(right, lo, hi, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AttributeIndex;

    fn tree(n: usize) -> RangeTree {
        let data: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let store = Arc::new(VectorStore::new(1, n, &data).unwrap());
        let keys: Vec<i32> = (0..n as i32).collect();
        let values: Vec<i32> = (0..n as i32).map(|i| i * 10).collect();
        let attrs = AttributeIndex::new(&keys, &values).unwrap();
        RangeTree::new(store, &attrs, GraphParams::new(4, 16))
    }

    #[test]
    fn test_topology_counts() {
        for n in [1, 2, 3, 7, 8, 33] {
            let t = tree(n);
            assert_eq!(t.node_count(), 2 * n - 1, "n={n}");
            assert_eq!(t.root().lo, 0);
            assert_eq!(t.root().hi, n);
            let leaves = (0..t.node_count() as u32)
                .filter(|&i| t.node(i).left.is_none())
                .count();
            assert_eq!(leaves, n, "n={n}");
        }
    }

    #[test]
    fn test_node_graphs_match_intervals() {
        let t = tree(13);
        for i in 0..t.node_count() as u32 {
            let node = t.node(i);
            assert_eq!(node.graph.len(), node.len());
            for (slot, pos) in (node.lo..node.hi).enumerate() {
                // attribute values are 10*id with ids in load order, so the
                // sorted order is the identity permutation
                assert_eq!(node.graph.id(slot as u32), pos as u32);
            }
        }
    }

    #[test]
    fn test_children_partition_parent() {
        let t = tree(21);
        for i in 0..t.node_count() as u32 {
            let node = t.node(i);
            match (node.left, node.right) {
                (Some(l), Some(r)) => {
                    let (l, r) = (t.node(l), t.node(r));
                    assert_eq!(l.lo, node.lo);
                    assert_eq!(l.hi, r.lo);
                    assert_eq!(r.hi, node.hi);
                    assert_eq!(l.hi, (node.lo + node.hi) / 2);
                }
                (None, None) => assert_eq!(node.len(), 1),
                _ => panic!("node with exactly one child"),
            }
        }
    }

    #[test]
    fn test_cover_is_disjoint_partition() {
        let n = 19;
        let t = tree(n);
        for lo in 0..n {
            for hi in lo..=n {
                let cover = t.cover(lo, hi);
                let mut positions: Vec<usize> = cover
                    .iter()
                    .flat_map(|&i| t.node(i).lo..t.node(i).hi)
                    .collect();
                positions.sort_unstable();
                assert_eq!(
                    positions,
                    (lo..hi).collect::<Vec<_>>(),
                    "cover of [{lo}, {hi}) broken"
                );
            }
        }
    }

    #[test]
    fn test_cover_size_bounded() {
        let n = 64;
        let t = tree(n);
        let bound = 2 * (n as f64).log2().ceil() as usize;
        for lo in 0..n {
            for hi in lo + 1..=n {
                let cover = t.cover(lo, hi);
                assert!(
                    cover.len() <= bound.max(1),
                    "cover of [{lo}, {hi}) has {} nodes",
                    cover.len()
                );
            }
        }
    }

    #[test]
    fn test_empty_interval_cover() {
        let t = tree(8);
        assert!(t.cover(3, 3).is_empty());
        assert!(t.cover(5, 2).is_empty());
    }

    #[test]
    fn test_each_id_on_root_to_leaf_path() {
        let n = 11;
        let t = tree(n);
        for id in 0..n as u32 {
            let holding = (0..t.node_count() as u32)
                .filter(|&i| {
                    let node = t.node(i);
                    (node.lo..node.hi).contains(&(id as usize))
                })
                .count();
            // id sits in its leaf and every ancestor; path length varies by
            // leaf depth in a non-power-of-two tree
            assert!(holding >= (n as f64).log2().floor() as usize + 1);
            assert!(holding <= (n as f64).log2().ceil() as usize + 1);
        }
    }
}
