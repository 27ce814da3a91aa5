//! Error types in Arboretum
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("dataset contains no samples")]
    EmptyDataset,
    #[error("target column {target} is out of bounds for {ncols} columns")]
    InvalidTarget { target: usize, ncols: usize },
    #[error("row {row} has {got} values, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("input has {got} values, expected {expected}")]
    FeatureCountMismatch { expected: usize, got: usize },
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
}
