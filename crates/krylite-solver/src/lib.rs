//! Iterative Krylov solvers for large sparse linear problems.
//!
//! The system matrix is never materialised: solvers drive the problem
//! through the [`LinearOperator`](krylite_core::LinearOperator) contract and
//! keep all state in a preallocated per-method workspace, so repeat solves
//! run without inner-loop allocation.
//!
//! Two kernels are provided:
//!
//! - [`cg_lanczos`] - short-recurrence solver for Hermitian systems, with an
//!   optional curvature monitor for indefinite operators.
//! - [`gmres`] - Arnoldi-based minimal-residual solver for general square
//!   systems, with left/right preconditioning, restarts, and optional
//!   reorthogonalisation.
//!
//! Each method exposes allocating entry points returning `(x, stats)` and an
//! in-place workspace API for repeat solves.
//!
//! # Usage
//!
//! ```ignore
//! use krylite_solver::{GmresConfig, gmres};
//!
//! let (x, stats) = gmres(&operator, &rhs, &GmresConfig::default())?;
//! assert!(stats.solved);
//! ```

pub mod cg_lanczos;
pub mod error;
pub mod givens;
pub mod gmres;
pub mod sparse;
pub mod stats;

pub use cg_lanczos::{
    CgLanczosCallback, CgLanczosConfig, CgLanczosWorkspace, cg_lanczos, cg_lanczos_warm,
};
pub use error::{Error, Result};
pub use givens::sym_givens;
pub use gmres::{GmresCallback, GmresConfig, GmresWorkspace, gmres, gmres_warm};
pub use sparse::{SparseComplexOperator, SparseOperator};
pub use stats::{LanczosStats, SimpleStats, SolverStatus};
