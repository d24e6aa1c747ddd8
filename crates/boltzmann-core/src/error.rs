use thiserror::Error;

/// Error type for matrix construction and access.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Data length {len} does not fit a {rows}x{cols} matrix")]
    DataLength { len: usize, rows: usize, cols: usize },

    #[error("Index out of bounds: index {index} for axis {axis} with size {size}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("Invalid range {start}..{end} for axis {axis} with size {size}")]
    InvalidRange {
        start: usize,
        end: usize,
        axis: usize,
        size: usize,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Empty matrix")]
    EmptyMatrix,
}

pub type MatrixResult<T> = Result<T, MatrixError>;
