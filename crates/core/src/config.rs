//! Global configuration constants for rangehnsw.
//!
//! All tuning parameters and input validation limits are defined here.
//! Runtime configuration is passed in via `BuildParams` and the query
//! arguments; these constants are the defaults and hard bounds.

/// Default number of bidirectional links per HNSW element.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64. Default: 16.
pub const DEFAULT_M: usize = 16;

/// Smallest accepted HNSW degree parameter.
///
/// The layer multiplier is `1/ln(M)`, which is undefined for M = 1.
pub const MIN_M: usize = 2;

/// Default ef parameter during graph construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down the build.
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Maximum number of layers in any per-node HNSW graph.
pub const MAX_LAYERS: usize = 16;

/// Default seed for the per-worker build RNGs.
pub const DEFAULT_SEED: u64 = 42;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;
