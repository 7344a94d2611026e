//! Parallel population of the range tree's graphs.
//!
//! Insertion-parallel strategy: every node exposes a claim cursor over its
//! position range, and all workers drain the node list in the same
//! size-descending order. Large nodes (the root above all) are therefore
//! populated by many workers at once under the graphs' per-element locks,
//! while small nodes drain in a single claim each. Inter-node ordering is
//! irrelevant to correctness, so workers flow into the next node as soon as
//! the previous one's slots are all claimed.

use crate::hnsw::HnswGraph;
use crate::tree::RangeTree;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Observability counters captured during a build.
#[derive(Debug, Clone, Copy)]
pub struct BuildStats {
    /// Peak number of workers observed running at once.
    pub peak_workers: usize,
    /// Number of tree nodes whose graphs were populated.
    pub nodes_built: usize,
    /// Total insertions across all graphs (`N * (avg tree depth + 1)`).
    pub total_inserts: usize,
}

struct NodeTask<'a> {
    graph: &'a HnswGraph,
    cursor: AtomicUsize,
}

/// Populate every node graph using `workers` OS threads.
///
/// Each worker owns a deterministic RNG seeded from the global seed plus
/// its worker index, so a single-worker build is exactly reproducible.
pub fn populate(tree: &RangeTree, workers: usize, seed: u64) -> BuildStats {
    debug_assert!(workers >= 1);
    let mut order: Vec<u32> = (0..tree.node_count() as u32).collect();
    order.sort_by_key(|&i| Reverse(tree.node(i).len()));

    let tasks: Vec<NodeTask<'_>> = order
        .iter()
        .map(|&i| NodeTask {
            graph: &tree.node(i).graph,
            cursor: AtomicUsize::new(0),
        })
        .collect();

    let total_inserts: usize = tasks.iter().map(|t| t.graph.len()).sum();
    tracing::debug!(
        nodes = tasks.len(),
        total_inserts,
        workers,
        "populating range tree graphs"
    );

    let active = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for worker in 0..workers {
            let tasks = &tasks;
            let active = &active;
            let peak = &peak;
            scope.spawn(move || {
                let running = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(running, Ordering::SeqCst);

                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(worker as u64));
                for task in tasks {
                    loop {
                        // Claims ascend, so insertion follows sorted-position
                        // order within each node (exactly when workers == 1).
                        let slot = task.cursor.fetch_add(1, Ordering::Relaxed);
                        if slot >= task.graph.len() {
                            break;
                        }
                        task.graph.insert(slot as u32, &mut rng);
                    }
                }

                active.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    BuildStats {
        peak_workers: peak.load(Ordering::SeqCst),
        nodes_built: tasks.len(),
        total_inserts,
    }
}
