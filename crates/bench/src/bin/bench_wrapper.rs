//! Combined wrapper: build once, sweep multiple ef_search values.
//!
//! Builds the index (timed) and then runs the full query set once per value
//! in a comma-separated `ef_search` list, printing one
//! `ef_search: <v> QPS: <q> Recall: <r>` line per sweep point. Output keys
//! match the established benchmark parsers.

use clap::Parser;
use rangehnsw_bench::{eval, init_logging, io, monitor};
use rangehnsw_core::{BuildParams, Error, RangeIndex, Result};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "bench-wrapper",
    about = "Build a range-filtered ANN index and sweep ef_search values"
)]
struct Args {
    /// Database vectors in .fvecs format
    data: PathBuf,

    /// Attribute file in 'key value' format
    attributes: PathBuf,

    /// Query vectors in .fvecs format
    queries: PathBuf,

    /// Query ranges, one `L-R` pair per line
    ranges: PathBuf,

    /// Groundtruth in .ivecs format
    groundtruth: PathBuf,

    /// Vector dimension
    dim: usize,

    /// HNSW degree parameter (max links per layer)
    m: usize,

    /// Construction ef parameter
    ef_construction: usize,

    /// Comma-separated list of ef_search values (e.g. 4,8,16,32)
    ef_search_list: String,

    /// Number of neighbors to return
    k: usize,

    /// Number of threads for index construction
    threads: usize,
}

fn run(args: &Args) -> Result<()> {
    let ef_search_list = io::parse_int_list(&args.ef_search_list)?;
    if ef_search_list.is_empty() {
        return Err(Error::parameter("ef_search list is empty"));
    }

    let (file_dim, vectors) = io::read_fvecs(&args.data)?;
    if file_dim != args.dim {
        return Err(Error::input_shape(format!(
            "data dimension mismatch: expected {}, file has {file_dim}",
            args.dim
        )));
    }
    let count = vectors.len() / file_dim;

    let (query_dim, queries) = io::read_fvecs(&args.queries)?;
    if query_dim != args.dim {
        return Err(Error::input_shape(format!(
            "query dimension mismatch: expected {}, file has {query_dim}",
            args.dim
        )));
    }
    let query_count = queries.len() / query_dim;

    let (keys, values) = io::read_attributes(&args.attributes)?;
    if values.len() != count {
        return Err(Error::input_shape(format!(
            "attribute count {} does not match vector count {count}",
            values.len()
        )));
    }

    let ranges = io::read_ranges(&args.ranges)?;
    if ranges.len() != query_count {
        return Err(Error::input_shape(format!(
            "range count {} does not match query count {query_count}",
            ranges.len()
        )));
    }

    let mut groundtruth = io::read_ivecs(&args.groundtruth)?;
    if groundtruth.len() != query_count {
        return Err(Error::input_shape(format!(
            "groundtruth count {} does not match query count {query_count}",
            groundtruth.len()
        )));
    }
    for row in &mut groundtruth {
        row.truncate(args.k);
    }

    tracing::info!(count, query_count, dim = args.dim, "inputs loaded");

    // ---------- index construction (timed) ----------
    let params = BuildParams {
        m: args.m,
        ef_construction: args.ef_construction,
        workers: args.threads,
        ..BuildParams::default()
    };

    let build_monitor = monitor::ThreadMonitor::start();
    let started = Instant::now();
    let index = RangeIndex::build(args.dim, &vectors, &keys, &values, &params)?;
    let build_secs = started.elapsed().as_secs_f64();
    let build_threads = build_monitor.stop();

    // ---------- query sweep (timed per ef_search) ----------
    let query_monitor = monitor::ThreadMonitor::start();
    let mut sweep: Vec<(usize, f64, f64)> = Vec::with_capacity(ef_search_list.len());

    for &ef_search in &ef_search_list {
        let mut results: Vec<Vec<u32>> = Vec::with_capacity(query_count);
        let started = Instant::now();
        for (i, &(low, high)) in ranges.iter().enumerate() {
            let query = &queries[i * args.dim..(i + 1) * args.dim];
            let hits = index.query_range(query, low, high, args.k, ef_search)?;
            results.push(hits.into_iter().map(|(id, _)| id).collect());
        }
        let elapsed = started.elapsed().as_secs_f64();
        let qps = eval::qps(query_count, elapsed);
        let recall = eval::recall(&results, &groundtruth, args.k);
        sweep.push((ef_search, qps, recall));
        tracing::info!(ef_search, qps, recall, "sweep point complete");
    }

    let query_threads = query_monitor.stop();

    // ---------- output ----------
    monitor::print_peak_memory();
    println!(
        "Maximum number of threads during index construction: {}",
        build_threads.saturating_sub(1)
    );
    println!(
        "Maximum number of threads during query execution: {}",
        query_threads.saturating_sub(1)
    );
    println!("Index construction time: {build_secs:.3} s");
    for (ef_search, qps, recall) in sweep {
        println!("ef_search: {ef_search} QPS: {qps:.3} Recall: {recall:.5}");
    }

    Ok(())
}

fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
