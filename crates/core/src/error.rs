//! Error types shared by every crate in the physarum workspace.

use thiserror::Error;

/// Errors produced by grid, engine and configuration operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero, or `width * height` overflowed.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// An (x, y) coordinate was outside the grid bounds.
    #[error("index ({x}, {y}) out of bounds for grid of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A buffer or grid did not match the expected dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// No engine is registered under the requested name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// A recognised config key carried a value that could not be parsed.
    #[error("malformed value '{value}' for config key '{key}' on line {line}")]
    MalformedConfig {
        key: String,
        value: String,
        line: usize,
    },

    /// A run spec parsed but described an unusable run, or did not parse.
    #[error("invalid run spec: {0}")]
    InvalidRunSpec(String),

    /// Reading or writing an external resource failed.
    #[error("i/o error: {0}")]
    Io(String),
}
