//! HNSW search: single-layer candidate-list search and multi-layer descent.
//!
//! `search_layer` drives both construction (candidate gathering during
//! insertion) and querying. Neighbor lists are copied out under a short
//! per-element lock, so search never holds more than one lock at a time and
//! is safe to run concurrently with insertions into the same graph.

use crate::hnsw::graph::HnswGraph;
use crate::hnsw::visited::SlotVisited;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// A candidate during search: max-heap on negative distance gives min-heap
/// behavior; equal distances pop the smaller slot first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    neg_distance: OrderedFloat<f32>,
    slot: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.neg_distance
            .cmp(&other.neg_distance)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A result entry: max-heap by distance for pruning the worst; equal
/// distances evict the larger slot first.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultEntry {
    distance: OrderedFloat<f32>,
    slot: u32,
}

impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.slot.cmp(&other.slot))
    }
}

impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl HnswGraph {
    /// Search a single layer of the graph.
    ///
    /// Returns the `ef` closest slots to the query at the given layer,
    /// ascending by `(distance, slot)`. `visited` is a reusable tracker;
    /// each call is its own traversal.
    pub(crate) fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[u32],
        ef: usize,
        layer: usize,
        visited: &mut SlotVisited,
    ) -> Vec<(f32, u32)> {
        visited.begin_search();
        let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef * 2);
        let mut results: BinaryHeap<ResultEntry> = BinaryHeap::with_capacity(ef + 1);
        // Cached worst distance — avoids repeated heap peeks in the hot loop
        let mut worst_dist = f32::MAX;
        let mut neighbor_buf: Vec<u32> = Vec::with_capacity(self.params.m_max0);

        for &ep in entry_points {
            if visited.first_visit(ep) {
                let dist = self.dist_to_query(query, ep);
                candidates.push(Candidate {
                    neg_distance: OrderedFloat(-dist),
                    slot: ep,
                });
                results.push(ResultEntry {
                    distance: OrderedFloat(dist),
                    slot: ep,
                });
                if results.len() >= ef {
                    worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
                }
            }
        }

        while let Some(candidate) = candidates.pop() {
            let c_dist = -candidate.neg_distance.0;

            // If the closest candidate is farther than the worst result, stop
            if results.len() >= ef && c_dist > worst_dist {
                break;
            }

            self.copy_links(candidate.slot, layer, &mut neighbor_buf);
            for i in 0..neighbor_buf.len() {
                let neighbor = neighbor_buf[i];

                // Prefetch the next neighbor's vector while processing this one
                if i + 1 < neighbor_buf.len() {
                    self.store.prefetch(self.ids[neighbor_buf[i + 1] as usize]);
                }

                if !visited.first_visit(neighbor) {
                    continue;
                }

                let dist = self.dist_to_query(query, neighbor);
                if results.len() < ef || dist < worst_dist {
                    candidates.push(Candidate {
                        neg_distance: OrderedFloat(-dist),
                        slot: neighbor,
                    });
                    results.push(ResultEntry {
                        distance: OrderedFloat(dist),
                        slot: neighbor,
                    });
                    if results.len() > ef {
                        results.pop(); // remove worst
                    }
                    worst_dist = results.peek().map_or(f32::MAX, |r| r.distance.0);
                }
            }
        }

        results
            .into_sorted_vec()
            .into_iter()
            .map(|r| (r.distance.0, r.slot))
            .collect()
    }

    /// Multi-layer search for the `ef` nearest elements to `query`.
    ///
    /// Descends from the entry point with a greedy ef=1 pass per upper
    /// layer, then runs the full candidate-list search on layer 0. Returns
    /// `(distance, internal id)` pairs ascending by distance. Empty graphs
    /// return an empty result.
    pub fn search(&self, query: &[f32], ef: usize) -> Vec<(f32, u32)> {
        let entry = match self.entry() {
            Some(ep) => ep,
            None => return Vec::new(),
        };

        let mut visited = SlotVisited::with_slots(self.len());
        let mut current = entry.slot;
        for layer in (1..=entry.layer).rev() {
            let found = self.search_layer(query, std::slice::from_ref(&current), 1, layer, &mut visited);
            if let Some(&(_, nearest)) = found.first() {
                current = nearest;
            }
        }

        let found = self.search_layer(query, std::slice::from_ref(&current), ef, 0, &mut visited);
        found
            .into_iter()
            .map(|(dist, slot)| (dist, self.ids[slot as usize]))
            .collect()
    }
}
