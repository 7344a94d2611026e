//! Read-only data storage shared by every graph in the index.
//!
//! The vector buffer and the attribute index are built once during
//! `RangeIndex::build` and never mutated afterwards, so graphs hold an
//! `Arc<VectorStore>` and read without synchronization.

/// Attribute values, the sorted permutation, and position lookups.
pub mod attributes;
/// SIMD squared-Euclidean distance kernels with scalar fallback.
pub mod simd;
/// Flat row-major vector buffer with bounded-time random access.
pub mod vectors;

pub use attributes::AttributeIndex;
pub use vectors::VectorStore;
