//! Range-filtered query execution for benchmark comparisons.
//!
//! There is no index persistence, so the wrapper rebuilds before querying
//! (untimed) using `ef_construction = max(200, 2 * ef_search)`, then runs
//! the query set single-threaded and prints `QUERY_TIME_SECONDS`, `QPS`,
//! `RECALL`, `PEAK_THREADS`, and the memory footprint block.

use clap::Parser;
use rangehnsw_bench::{eval, init_logging, io, monitor};
use rangehnsw_core::{BuildParams, Error, RangeIndex, Result};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "search-wrapper", about = "Run range-filtered ANN queries (timed)")]
struct Args {
    /// Database vectors in .fvecs format
    #[arg(long = "data_path")]
    data_path: PathBuf,

    /// Query vectors in .fvecs format
    #[arg(long = "query_path")]
    query_path: PathBuf,

    /// Query ranges, one `L-R` pair per line
    #[arg(long = "query_ranges_file")]
    query_ranges_file: PathBuf,

    /// Groundtruth in .ivecs format
    #[arg(long = "groundtruth_file")]
    groundtruth_file: PathBuf,

    /// Attributes in 'key value' format
    #[arg(long = "attributes_file")]
    attributes_file: PathBuf,

    /// Vector dimension
    #[arg(long)]
    dim: usize,

    /// Search ef parameter
    #[arg(long = "ef_search")]
    ef_search: usize,

    /// Number of neighbors to return
    #[arg(long)]
    k: usize,

    /// HNSW degree parameter (used for the rebuild)
    #[arg(long = "M")]
    m: usize,
}

fn run(args: &Args) -> Result<()> {
    let (file_dim, vectors) = io::read_fvecs(&args.data_path)?;
    if file_dim != args.dim {
        return Err(Error::input_shape(format!(
            "data dimension mismatch: expected {}, file has {file_dim}",
            args.dim
        )));
    }
    let count = vectors.len() / file_dim;

    let (query_dim, queries) = io::read_fvecs(&args.query_path)?;
    if query_dim != args.dim {
        return Err(Error::input_shape(format!(
            "query dimension mismatch: expected {}, file has {query_dim}",
            args.dim
        )));
    }
    let query_count = queries.len() / query_dim;

    let (keys, values) = io::read_attributes(&args.attributes_file)?;
    if values.len() != count {
        return Err(Error::input_shape(format!(
            "attribute count {} does not match vector count {count}",
            values.len()
        )));
    }

    let ranges = io::read_ranges(&args.query_ranges_file)?;
    if ranges.len() != query_count {
        return Err(Error::input_shape(format!(
            "range count {} does not match query count {query_count}",
            ranges.len()
        )));
    }

    let groundtruth = io::read_ivecs(&args.groundtruth_file)?;
    if groundtruth.len() != query_count {
        return Err(Error::input_shape(format!(
            "groundtruth count {} does not match query count {query_count}",
            groundtruth.len()
        )));
    }

    tracing::info!(count, query_count, "inputs loaded; rebuilding index (untimed)");

    // ef_construction is not part of this wrapper's surface; rebuild with a
    // quality floor scaled to the requested search effort.
    let ef_construction = 200.max(2 * args.ef_search);
    let params = BuildParams {
        m: args.m,
        ef_construction,
        workers: std::thread::available_parallelism().map_or(1, |p| p.get()),
        ..BuildParams::default()
    };
    let index = RangeIndex::build(args.dim, &vectors, &keys, &values, &params)?;
    tracing::info!("index rebuilt; starting timed query phase");

    let thread_monitor = monitor::ThreadMonitor::start();
    let mut results: Vec<Vec<u32>> = Vec::with_capacity(query_count);

    let started = Instant::now();
    for (i, &(low, high)) in ranges.iter().enumerate() {
        let query = &queries[i * args.dim..(i + 1) * args.dim];
        let hits = index.query_range(query, low, high, args.k, args.ef_search)?;
        results.push(hits.into_iter().map(|(id, _)| id).collect());
        if (i + 1) % 1000 == 0 {
            tracing::info!("processed {} / {query_count} queries", i + 1);
        }
    }
    let query_secs = started.elapsed().as_secs_f64();
    let peak_threads = thread_monitor.stop();

    let recall = eval::recall(&results, &groundtruth, args.k);
    let qps = eval::qps(query_count, query_secs);

    println!("QUERY_TIME_SECONDS: {query_secs:.6}");
    println!("QPS: {qps:.3}");
    println!("RECALL: {recall:.5}");
    println!("PEAK_THREADS: {}", peak_threads.saturating_sub(1));
    monitor::print_peak_memory();

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
