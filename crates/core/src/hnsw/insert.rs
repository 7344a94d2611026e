//! HNSW insertion.
//!
//! Inserts an element with bidirectional connections and heuristic neighbor
//! pruning (Algorithm 4 from the HNSW paper). `insert` takes `&self`: the
//! builder runs it from many workers at once, relying on the per-element
//! adjacency locks. Locks are taken one at a time — neighbors in ascending
//! slot order — so no lock cycle can form. The element's own links are
//! published before any reciprocal edge makes it reachable, which keeps
//! every observable element fully linked, and pruned edges are removed from
//! both endpoints so adjacency stays symmetric once insertions complete.

use crate::hnsw::graph::{EntryPoint, HnswGraph};
use crate::hnsw::visited::SlotVisited;
use rand::Rng;
use std::cell::RefCell;
use std::cmp::Ordering;

/// Reusable per-thread buffers for the insert path. Eliminates per-insert
/// allocation and keeps the pruning scratch out of the element locks'
/// allocation path once warmed up.
#[derive(Default)]
struct InsertScratch {
    visited: SlotVisited,
    cand: Vec<(f32, u32)>,
    sel: Vec<(f32, u32)>,
    evicted: Vec<u32>,
}

thread_local! {
    static INSERT_SCRATCH: RefCell<InsertScratch> = RefCell::new(InsertScratch::default());
}

impl HnswGraph {
    /// Insert the element in `slot` into the graph.
    ///
    /// Safe to call concurrently for distinct slots; each slot must be
    /// inserted exactly once.
    pub fn insert<R: Rng>(&self, slot: u32, rng: &mut R) {
        let level = self.random_level(rng);
        let query = self.store.get(self.ids[slot as usize]);

        // Allocate the element's layer lists before any lock is taken.
        // cap + 1 headroom lets a reciprocal push land before pruning.
        let mut new_links: Vec<Vec<u32>> = (0..=level)
            .map(|l| Vec::with_capacity(self.params.cap(l) + 1))
            .collect();

        // First element: publish under the entry write lock and return.
        let entry = match self.entry() {
            Some(ep) => ep,
            None => {
                let mut entry = self.entry.write();
                match *entry {
                    None => {
                        *self.elements[slot as usize].links.lock() = new_links;
                        *entry = Some(EntryPoint { slot, layer: level });
                        return;
                    }
                    // Lost the race; someone else seeded the graph.
                    Some(ep) => ep,
                }
            }
        };

        let top = level.min(entry.layer);
        INSERT_SCRATCH.with(|cell| {
            let scratch = &mut *cell.borrow_mut();

            // Phase 1: greedy descent from the entry's top layer to level+1.
            let mut current = entry.slot;
            for layer in (level + 1..=entry.layer).rev() {
                let found = self.search_layer(
                    query,
                    std::slice::from_ref(&current),
                    1,
                    layer,
                    &mut scratch.visited,
                );
                if let Some(&(_, nearest)) = found.first() {
                    current = nearest;
                }
            }

            // Phase 2: gather candidates per layer and pick diverse neighbors.
            let mut selected: Vec<Vec<(f32, u32)>> = vec![Vec::new(); top + 1];
            let mut layer_eps: Vec<u32> = vec![current];
            for layer in (0..=top).rev() {
                let candidates = self.search_layer(
                    query,
                    &layer_eps,
                    self.params.ef_construction,
                    layer,
                    &mut scratch.visited,
                );
                let mut picked = Vec::with_capacity(self.params.cap(layer));
                self.select_neighbors(&candidates, self.params.cap(layer), &mut picked);
                new_links[layer].extend(picked.iter().map(|&(_, s)| s));
                selected[layer] = picked;

                // Candidates seed the next (lower) layer.
                layer_eps.clear();
                layer_eps.extend(candidates.iter().map(|&(_, s)| s));
                if layer_eps.is_empty() {
                    layer_eps.push(entry.slot);
                }
            }

            // Phase 3: publish own links first, then add reciprocal edges.
            // Until the first reciprocal edge lands, no traversal can reach
            // this slot, so observers always see it fully linked.
            *self.elements[slot as usize].links.lock() = new_links;

            for (layer, picked) in selected.iter_mut().enumerate() {
                let cap = self.params.cap(layer);
                picked.sort_unstable_by_key(|&(_, s)| s);
                for &(_, neighbor) in picked.iter() {
                    scratch.evicted.clear();
                    {
                        let mut links = self.elements[neighbor as usize].links.lock();
                        debug_assert!(
                            layer < links.len(),
                            "neighbor missing the layer it was found on"
                        );
                        let Some(list) = links.get_mut(layer) else {
                            continue;
                        };
                        list.push(slot);
                        if list.len() > cap {
                            self.shrink_list(
                                neighbor,
                                list,
                                cap,
                                &mut scratch.cand,
                                &mut scratch.sel,
                                &mut scratch.evicted,
                            );
                        }
                    }
                    // A pruned edge comes out of both endpoints, or a stale
                    // half-edge would survive. Still one lock at a time: the
                    // neighbor's guard dropped above.
                    for &evicted in scratch.evicted.iter() {
                        let mut links = self.elements[evicted as usize].links.lock();
                        if let Some(list) = links.get_mut(layer) {
                            if let Some(pos) = list.iter().position(|&e| e == neighbor) {
                                list.swap_remove(pos);
                            }
                        }
                    }
                }
            }
        });

        // Entry-point replacement under the graph-wide coarse lock.
        if level > entry.layer {
            let mut entry = self.entry.write();
            match *entry {
                Some(current) if level > current.layer => {
                    *entry = Some(EntryPoint { slot, layer: level });
                }
                _ => {}
            }
        }
    }

    /// Heuristic neighbor selection (Algorithm 4 from the HNSW paper).
    ///
    /// `candidates` must be ascending by `(distance, slot)`, as returned by
    /// `search_layer`. A candidate is kept only if it is closer to the base
    /// element than to every already-selected neighbor; this prunes
    /// redundant near-duplicate edges and preserves long-range diversity.
    /// Remaining capacity is backfilled with the closest skipped candidates.
    fn select_neighbors(&self, candidates: &[(f32, u32)], m: usize, out: &mut Vec<(f32, u32)>) {
        for &(dist, c) in candidates {
            if out.len() >= m {
                break;
            }
            let diverse = out.iter().all(|&(_, s)| dist <= self.dist_between(c, s));
            if diverse {
                out.push((dist, c));
            }
        }
        if out.len() < m {
            for &(dist, c) in candidates {
                if out.len() >= m {
                    break;
                }
                if !out.iter().any(|&(_, s)| s == c) {
                    out.push((dist, c));
                }
            }
        }
    }

    /// Re-apply the selection heuristic to an over-capacity neighbor list,
    /// keyed by distance from `base`. Rewrites `list` in place and reports
    /// the dropped slots in `evicted`; `cand` and `sel` are caller-provided
    /// scratch so nothing allocates while the element lock is held (after
    /// warm-up).
    fn shrink_list(
        &self,
        base: u32,
        list: &mut Vec<u32>,
        cap: usize,
        cand: &mut Vec<(f32, u32)>,
        sel: &mut Vec<(f32, u32)>,
        evicted: &mut Vec<u32>,
    ) {
        cand.clear();
        cand.extend(list.iter().map(|&s| (self.dist_between(base, s), s)));
        cand.sort_unstable_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        sel.clear();
        for &(dist, c) in cand.iter() {
            if sel.len() >= cap {
                break;
            }
            let diverse = sel.iter().all(|&(_, s)| dist <= self.dist_between(c, s));
            if diverse {
                sel.push((dist, c));
            }
        }
        if sel.len() < cap {
            for &(dist, c) in cand.iter() {
                if sel.len() >= cap {
                    break;
                }
                if !sel.iter().any(|&(_, s)| s == c) {
                    sel.push((dist, c));
                }
            }
        }
        list.clear();
        list.extend(sel.iter().map(|&(_, s)| s));
        evicted.extend(
            cand.iter()
                .map(|&(_, s)| s)
                .filter(|s| !list.contains(s)),
        );
    }
}
