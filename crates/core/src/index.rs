//! The public index: build API and range query engine.
//!
//! [`RangeIndex::build`] copies the caller's vectors and attributes, lays
//! out the range tree, and populates every node graph across a worker pool.
//! [`RangeIndex::query_range`] translates an attribute interval into a
//! sorted-position interval, enumerates the minimal tree cover, searches
//! each cover node's graph, and merges into a size-k result.
//!
//! The index is immutable after `build`; queries take `&self` and are safe
//! to run concurrently.

use crate::config;
use crate::error::{Error, Result};
use crate::hnsw::GraphParams;
use crate::store::{AttributeIndex, VectorStore};
use crate::tree::build::{populate, BuildStats};
use crate::tree::RangeTree;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Instant;

/// Construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildParams {
    /// HNSW degree parameter: max links per element per layer (layer 0 uses `2M`).
    pub m: usize,
    /// Candidate list size during graph construction.
    pub ef_construction: usize,
    /// Number of build worker threads.
    pub workers: usize,
    /// Seed for the per-worker build RNGs.
    pub seed: u64,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            m: config::DEFAULT_M,
            ef_construction: config::DEFAULT_EF_CONSTRUCTION,
            workers: 1,
            seed: config::DEFAULT_SEED,
        }
    }
}

/// Merge-heap entry: max-heap by `(distance, id)` so the worst survivor is
/// evicted first and equal distances resolve to the smaller id.
#[derive(Debug, PartialEq, Eq)]
struct Hit {
    distance: OrderedFloat<f32>,
    id: u32,
}

impl Ord for Hit {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Hit {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Range-filtered approximate nearest neighbor index.
#[derive(Debug)]
pub struct RangeIndex {
    store: Arc<VectorStore>,
    attrs: AttributeIndex,
    tree: RangeTree,
    stats: BuildStats,
}

impl RangeIndex {
    /// Build an index over `count = values.len()` vectors of dimension
    /// `dim`, supplied row-major in `vectors`, with one `(key, value)`
    /// attribute pair per vector. The caller keeps ownership of the inputs;
    /// the index copies what it needs.
    ///
    /// Construction is all-or-nothing: on error nothing is retained.
    pub fn build(
        dim: usize,
        vectors: &[f32],
        keys: &[i32],
        values: &[i32],
        params: &BuildParams,
    ) -> Result<Self> {
        if params.m < config::MIN_M {
            return Err(Error::parameter(format!(
                "M must be at least {}, got {}",
                config::MIN_M,
                params.m
            )));
        }
        if params.ef_construction == 0 {
            return Err(Error::parameter("ef_construction must be positive"));
        }
        if params.workers == 0 {
            return Err(Error::parameter("worker count must be positive"));
        }
        if values.is_empty() {
            return Err(Error::parameter("cannot build an index over zero vectors"));
        }

        let attrs = AttributeIndex::new(keys, values)?;
        let store = Arc::new(VectorStore::new(dim, attrs.len(), vectors)?);

        let graph_params = GraphParams::new(params.m, params.ef_construction);
        let tree = RangeTree::new(Arc::clone(&store), &attrs, graph_params);

        let started = Instant::now();
        let stats = populate(&tree, params.workers, params.seed);
        tracing::debug!(
            vectors = attrs.len(),
            dim,
            nodes = stats.nodes_built,
            total_inserts = stats.total_inserts,
            peak_workers = stats.peak_workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index build complete"
        );

        Ok(Self {
            store,
            attrs,
            tree,
            stats,
        })
    }

    /// Number of indexed vectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the index is empty (never: build rejects N = 0).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Vector dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.store.dim()
    }

    /// Attribute value of an internal id.
    #[inline]
    pub fn attribute(&self, id: u32) -> i32 {
        self.attrs.value(id)
    }

    /// External key of an internal id. Opaque; echoed for callers that
    /// joined on their own identifiers.
    #[inline]
    pub fn key(&self, id: u32) -> i32 {
        self.attrs.key(id)
    }

    /// Build observability counters.
    #[inline]
    pub fn build_stats(&self) -> BuildStats {
        self.stats
    }

    /// Answer a range-filtered k-nearest-neighbor query.
    ///
    /// Returns up to `k` `(internal id, squared distance)` pairs whose
    /// attribute value lies in `[low, high]`, ascending by distance, equal
    /// distances broken toward the smaller id. A valid interval containing
    /// no vectors yields an empty result; an inverted interval is an error.
    pub fn query_range(
        &self,
        query: &[f32],
        low: i32,
        high: i32,
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(u32, f32)>> {
        if query.len() != self.store.dim() {
            return Err(Error::input_shape(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.store.dim()
            )));
        }
        if k == 0 {
            return Err(Error::parameter("k must be positive"));
        }
        if ef_search == 0 {
            return Err(Error::parameter("ef_search must be positive"));
        }
        if low > high {
            return Err(Error::parameter(format!(
                "inverted filter interval: {low} > {high}"
            )));
        }

        let (pos_lo, pos_hi) = self.attrs.position_range(low, high);
        if pos_lo >= pos_hi {
            return Ok(Vec::new());
        }

        let cover = self.tree.cover(pos_lo, pos_hi);
        let ef = ef_search.max(k);

        // Cover nodes are disjoint, so ids never collide across searches.
        let mut best: BinaryHeap<Hit> = BinaryHeap::with_capacity(k + 1);
        for node_idx in cover {
            let graph = &self.tree.node(node_idx).graph;
            for (dist, id) in graph.search(query, ef) {
                best.push(Hit {
                    distance: OrderedFloat(dist),
                    id,
                });
                if best.len() > k {
                    best.pop();
                }
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|hit| (hit.id, hit.distance.0))
            .collect())
    }
}
