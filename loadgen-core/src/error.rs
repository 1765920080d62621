//! Core error types for loadgen

use thiserror::Error;

/// Core error type for all workload errors
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Numeric kernel errors
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    /// Transaction analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Result type alias for workload operations
pub type WorkloadResult<T> = std::result::Result<T, WorkloadError>;

/// Numeric kernel errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("Matrix dimension mismatch: left operand has {left_cols} columns, right operand has {right_rows} rows")]
    DimensionMismatch { left_cols: usize, right_rows: usize },

    #[error("Ragged matrix: row {row} has {actual} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Right operand of a matrix product must have at least one row")]
    EmptyMatrix,
}

/// Transaction analysis errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("expand_factor must be between {min} and {max}, got {actual}")]
    ExpandFactorOutOfRange { actual: i64, min: i64, max: i64 },
}
