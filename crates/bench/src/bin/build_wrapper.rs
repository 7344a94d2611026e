//! Timed index construction for benchmark comparisons.
//!
//! Loads a vector file and its attribute file, builds the range index with
//! the requested parameters, and prints `BUILD_TIME_SECONDS`,
//! `PEAK_THREADS`, and the memory footprint block. The index is discarded
//! on exit — there is no serialization, the search wrappers rebuild.

use clap::Parser;
use rangehnsw_bench::{init_logging, io, monitor};
use rangehnsw_core::{BuildParams, Error, RangeIndex, Result};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "build-wrapper", about = "Build a range-filtered ANN index (timed)")]
struct Args {
    /// Database vectors in .fvecs format
    data: PathBuf,

    /// Attribute file in 'key value' format
    attributes: PathBuf,

    /// Vector dimension (validated against the data file)
    dim: usize,

    /// HNSW degree parameter (max links per layer)
    m: usize,

    /// Construction ef parameter
    ef_construction: usize,

    /// Number of threads for index construction
    threads: usize,
}

fn run(args: &Args) -> Result<()> {
    let (file_dim, vectors) = io::read_fvecs(&args.data)?;
    if file_dim != args.dim {
        return Err(Error::input_shape(format!(
            "dimension mismatch: expected {}, file has {file_dim}",
            args.dim
        )));
    }
    let count = vectors.len() / file_dim;
    tracing::info!(count, dim = file_dim, "loaded database vectors");

    let (keys, values) = io::read_attributes(&args.attributes)?;
    if values.len() != count {
        return Err(Error::input_shape(format!(
            "attribute count {} does not match vector count {count}",
            values.len()
        )));
    }
    tracing::info!(count = values.len(), "loaded attribute pairs");

    let params = BuildParams {
        m: args.m,
        ef_construction: args.ef_construction,
        workers: args.threads,
        ..BuildParams::default()
    };

    let thread_monitor = monitor::ThreadMonitor::start();
    let started = Instant::now();
    let index = RangeIndex::build(args.dim, &vectors, &keys, &values, &params)?;
    let build_secs = started.elapsed().as_secs_f64();
    let peak_threads = thread_monitor.stop();

    tracing::info!(
        peak_workers = index.build_stats().peak_workers,
        nodes = index.build_stats().nodes_built,
        "index construction complete"
    );

    println!("BUILD_TIME_SECONDS: {build_secs:.3}");
    // Subtract the monitoring thread itself.
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
