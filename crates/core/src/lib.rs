//! # rangehnsw-core
//!
//! In-memory range-filtered approximate nearest neighbor index.
//!
//! The index composes a segment tree over the attribute-sorted order of the
//! dataset with one HNSW proximity graph per tree node. A query interval
//! `[L, R]` on the attribute decomposes into `O(log N)` tree nodes whose
//! graphs contain only eligible candidates, so the filter never has to be
//! applied as a post-check during graph traversal.
//!
//! This is the core library crate with zero async or CLI dependencies —
//! the benchmark harness lives in `rangehnsw-bench`.

/// Global configuration constants: defaults, limits, and tuning parameters.
pub mod config;
/// Error type and `Result` alias for build and query operations.
pub mod error;
/// HNSW proximity graph: structure, insertion, search, and visited set.
pub mod hnsw;
/// The public index: build API and range query engine.
pub mod index;
/// Vector buffer, SIMD distance kernels, and the attribute index.
pub mod store;
/// Range tree over the attribute-sorted order and its parallel builder.
pub mod tree;

pub use error::{Error, Result};
pub use index::{BuildParams, RangeIndex};
