//! Hierarchical Navigable Small World (HNSW) proximity graph.
//!
//! One graph exists per range tree node, restricted to that node's id set.
//! Elements address each other by *slot* — the index into the node's element
//! table — and only the slot → internal-id mapping touches global id space.
//!
//! A graph lives through two strictly separated phases. During the build
//! phase many workers call [`HnswGraph::insert`] concurrently; per-element
//! mutexes guard the adjacency lists and a graph-wide `RwLock` guards the
//! entry point. During the query phase the graph is read-only and
//! [`HnswGraph::search`] is safe to call from any number of threads.

/// Graph structure, parameters, and the per-element adjacency table.
pub mod graph;
/// Insertion with reciprocal edges and heuristic neighbor pruning.
pub mod insert;
/// Candidate-list search over a single layer and multi-layer descent.
pub mod search;
/// Epoch-stamped visited tracking for graph traversal.
pub mod visited;

pub use graph::{GraphParams, HnswGraph};
pub use visited::SlotVisited;
