//! Error types for solver entry points.
//!
//! Only precondition failures are errors: a malformed problem is rejected
//! eagerly, before any workspace mutation. Algorithmic outcomes (iteration
//! cap, breakdown, indefiniteness, inconsistency, user cancellation) are
//! reported through the solve statistics instead.

use thiserror::Error;

/// Errors raised when a solve is set up incorrectly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The operator of a square-system method is not square.
    #[error("system must be square ({rows}x{cols})")]
    NonSquareSystem { rows: usize, cols: usize },

    /// A vector or operator dimension does not match the workspace.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type for solver entry points.
pub type Result<T> = std::result::Result<T, Error>;
