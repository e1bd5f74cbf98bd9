//! Error types for membrane-solver

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SolverError>;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Sparse format error: {0}")]
    SparseFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
