//! Error types for matrix construction and solver configuration.

use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum SolverError {
    #[error("cost matrix must have at least 2 vertices, got {0}")]
    TooSmall(usize),
    #[error("cost matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("invalid cost {value} at ({row}, {col}): costs must be non-negative or +inf")]
    InvalidCost { row: usize, col: usize, value: f64 },
    #[error("start vertex {vertex} out of range for a matrix of dimension {dimension}")]
    StartVertexOutOfRange { vertex: usize, dimension: usize },
}

pub type Result<T> = std::result::Result<T, SolverError>;

impl SolverError {
    pub fn not_square(row: usize, len: usize, expected: usize) -> Self {
        Self::NotSquare { row, len, expected }
    }

    pub fn invalid_cost(row: usize, col: usize, value: f64) -> Self {
        Self::InvalidCost { row, col, value }
    }
}
