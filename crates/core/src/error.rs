//! Error types for rangehnsw.
//!
//! Recoverable failures surface as [`Error`] at API boundaries. Internal
//! invariant violations (broken reciprocity, degree overflow, a missing
//! entry point on a non-empty graph) are bugs, checked with `debug_assert!`
//! during the build rather than reported through `Result`.

use thiserror::Error;

/// Error raised by index construction, querying, or harness I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// Input arrays disagree with the declared shape: dimension mismatch,
    /// attribute count differing from vector count, malformed records.
    #[error("input shape error: {0}")]
    InputShape(String),

    /// File could not be opened or read to completion.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied parameter is out of range (non-positive `d`, `M`,
    /// `ef`, `k`, or an inverted filter interval).
    #[error("invalid parameter: {0}")]
    Parameter(String),

    /// An internal invariant failed. Indicates a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for rangehnsw operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Convenience constructor for [`Error::Parameter`].
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }

    /// Convenience constructor for [`Error::InputShape`].
    pub fn input_shape(msg: impl Into<String>) -> Self {
        Self::InputShape(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let e = Error::parameter("k must be positive");
        assert!(e.to_string().contains("k must be positive"));
        let e = Error::input_shape("expected 128 floats, got 64");
        assert!(e.to_string().contains("128"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.fvecs");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("missing.fvecs"));
    }
}
