//! Error types for the MILP session layer.

use thiserror::Error;

/// Errors from session construction, mutation, and solving.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MilpError {
    /// An input array's length is inconsistent with the problem dimensions.
    #[error("{name} has length {actual}, expected {expected}")]
    BadLength {
        /// Which array failed the check.
        name: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The constraint matrix shape disagrees with the stated dimensions.
    #[error("constraint matrix is {actual_rows}x{actual_cols}, expected {rows}x{cols}")]
    BadMatrixShape {
        /// Expected row count (constraints).
        rows: usize,
        /// Expected column count (variables).
        cols: usize,
        /// Rows actually supplied.
        actual_rows: usize,
        /// Columns actually supplied.
        actual_cols: usize,
    },

    /// A variable index is out of range.
    #[error("variable index {index} out of range (n={num_vars})")]
    VariableOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of variables.
        num_vars: usize,
    },

    /// A constraint index is out of range.
    #[error("constraint index {index} out of range (m={num_constraints})")]
    ConstraintOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of constraints.
        num_constraints: usize,
    },

    /// A solution query was made before any successful solve.
    #[error("no solution available: solve has not produced one")]
    NoSolution,

    /// The engine failed.
    #[error("engine failure: {0}")]
    Engine(String),
}

/// Result type for session operations.
pub type MilpResult<T> = Result<T, MilpError>;
