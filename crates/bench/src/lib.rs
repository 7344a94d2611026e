//! # rangehnsw-bench
//!
//! Benchmark harness around `rangehnsw-core`: input-file readers for the
//! `.fvecs`/`.ivecs` benchmark formats, recall and QPS evaluation, and the
//! peak memory / thread-count reporters the wrapper binaries print.
//!
//! All wrapper binaries emit stable `KEY: value` lines on stdout for the
//! surrounding benchmark scripts to parse; diagnostics go to stderr via
//! `tracing`.

/// Recall and throughput evaluation.
pub mod eval;
/// Readers for `.fvecs`, `.ivecs`, attribute, and query-range files.
pub mod io;
/// Peak memory footprint and thread-count monitoring.
pub mod monitor;

use tracing_subscriber::EnvFilter;

/// Initialize stderr logging for a wrapper binary. Honors `RUST_LOG`,
/// defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
