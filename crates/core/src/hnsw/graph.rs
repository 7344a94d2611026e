//! HNSW graph structure and parameters.
//!
//! [`GraphParams`] carries the tuning knobs shared by every graph in an
//! index. [`HnswGraph`] owns the per-element adjacency table for one range
//! tree node; vector data stays in the shared [`VectorStore`].

use crate::config;
use crate::store::VectorStore;
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tuning parameters for HNSW graph construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GraphParams {
    /// Number of bidirectional links per element (except layer 0).
    pub m: usize,
    /// Maximum links per element at layer 0 (`2 * m`).
    pub m_max0: usize,
    /// Candidate list size during construction.
    pub ef_construction: usize,
    /// Maximum number of layers in the graph.
    pub max_layers: usize,
    /// Level generation multiplier, `1 / ln(m)`.
    pub ml: f64,
}

impl GraphParams {
    pub fn new(m: usize, ef_construction: usize) -> Self {
        Self {
            m,
            m_max0: m * 2,
            ef_construction,
            max_layers: config::MAX_LAYERS,
            ml: 1.0 / (m as f64).ln(),
        }
    }

    /// Degree cap at the given layer: `2M` at layer 0, `M` above.
    #[inline]
    pub fn cap(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0
        } else {
            self.m
        }
    }
}

/// One element's adjacency lists, all layers, behind its insertion lock.
///
/// An empty outer `Vec` means the element has not been inserted yet; after
/// insertion the outer length is the element's top layer + 1 and each inner
/// list is pre-reserved to its degree cap + 1 so reciprocal-edge pushes
/// never allocate while the lock is held.
#[derive(Debug, Default)]
pub(crate) struct Element {
    pub(crate) links: Mutex<Vec<Vec<u32>>>,
}

/// Entry point of a graph: an element slot and its top layer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryPoint {
    pub slot: u32,
    pub layer: usize,
}

/// Proximity graph over one range tree node's id set.
///
/// Slots are indices into `ids`; `ids[slot]` is the internal vector id.
/// The slot order follows the node's sorted-position interval, so slot
/// neighbors are attribute neighbors as well.
#[derive(Debug)]
pub struct HnswGraph {
    pub(crate) store: Arc<VectorStore>,
    pub(crate) ids: Vec<u32>,
    pub(crate) params: GraphParams,
    pub(crate) elements: Vec<Element>,
    pub(crate) entry: RwLock<Option<EntryPoint>>,
}

impl HnswGraph {
    /// Create an empty graph over the given id set. Elements are allocated
    /// up front; adjacency fills in as the builder inserts each slot.
    pub fn new(store: Arc<VectorStore>, ids: Vec<u32>, params: GraphParams) -> Self {
        let mut elements = Vec::with_capacity(ids.len());
        elements.resize_with(ids.len(), Element::default);
        Self {
            store,
            ids,
            params,
            elements,
            entry: RwLock::new(None),
        }
    }

    /// Number of element slots in this graph.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the graph covers no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Internal vector id of the given slot.
    #[inline]
    pub fn id(&self, slot: u32) -> u32 {
        self.ids[slot as usize]
    }

    /// Sample a top layer for a new element using the geometric
    /// distribution with base `1 / ln(M)`.
    pub(crate) fn random_level<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.gen();
        let level = (-r.ln() * self.params.ml).floor() as usize;
        level.min(self.params.max_layers - 1)
    }

    /// Current entry point, if any element has been inserted.
    #[inline]
    pub(crate) fn entry(&self) -> Option<EntryPoint> {
        *self.entry.read()
    }

    /// Squared distance from a query vector to the element in `slot`.
    #[inline]
    pub(crate) fn dist_to_query(&self, query: &[f32], slot: u32) -> f32 {
        self.store.distance_to(query, self.ids[slot as usize])
    }

    /// Squared distance between two elements of this graph.
    #[inline]
    pub(crate) fn dist_between(&self, a: u32, b: u32) -> f32 {
        self.store
            .distance(self.ids[a as usize], self.ids[b as usize])
    }

    /// Copy one element's neighbor list at `layer` into `buf`.
    ///
    /// The element lock is held only for the copy, so callers never hold
    /// more than one lock at a time while traversing.
    #[inline]
    pub(crate) fn copy_links(&self, slot: u32, layer: usize, buf: &mut Vec<u32>) {
        buf.clear();
        let links = self.elements[slot as usize].links.lock();
        if let Some(list) = links.get(layer) {
            buf.extend_from_slice(list);
        }
    }

    /// Snapshot of an element's neighbors at a layer (diagnostics/tests).
    pub fn neighbors_of(&self, slot: u32, layer: usize) -> Vec<u32> {
        let links = self.elements[slot as usize].links.lock();
        links.get(layer).cloned().unwrap_or_default()
    }

    /// Top layer of an inserted element, or `None` before insertion.
    pub fn top_layer_of(&self, slot: u32) -> Option<usize> {
        let links = self.elements[slot as usize].links.lock();
        links.len().checked_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_store(n: usize) -> Arc<VectorStore> {
        let data: Vec<f32> = (0..n).map(|i| i as f32).collect();
        Arc::new(VectorStore::new(1, n, &data).unwrap())
    }

    #[test]
    fn test_new_empty_graph() {
        let g = HnswGraph::new(tiny_store(4), vec![0, 1, 2, 3], GraphParams::new(4, 10));
        assert_eq!(g.len(), 4);
        assert!(!g.is_empty());
        assert!(g.entry().is_none());
        assert!(g.top_layer_of(0).is_none());
    }

    #[test]
    fn test_params_caps() {
        let p = GraphParams::new(16, 200);
        assert_eq!(p.cap(0), 32);
        assert_eq!(p.cap(1), 16);
        assert_eq!(p.cap(5), 16);
    }

    #[test]
    fn test_random_level_respects_max() {
        let g = HnswGraph::new(tiny_store(1), vec![0], GraphParams::new(2, 10));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(g.random_level(&mut rng) < g.params.max_layers);
        }
    }

    #[test]
    fn test_distances_use_slot_indirection() {
        // ids deliberately permuted relative to slots
        let g = HnswGraph::new(tiny_store(4), vec![3, 0], GraphParams::new(4, 10));
        assert_eq!(g.dist_between(0, 1), 9.0);
        assert_eq!(g.dist_to_query(&[2.0], 1), 4.0);
    }
}
