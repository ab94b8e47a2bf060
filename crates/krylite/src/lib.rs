//! Krylov subspace methods for large sparse linear problems.
//!
//! The solvers only ever touch the system through operator-vector products,
//! so they scale to problems where the matrix is never formed. Each method
//! owns a preallocated workspace for in-place repeat solves, and is generic
//! over real and complex scalars.
//!
//! # Example
//!
//! ```
//! use krylite::{DiagonalOperator, GmresConfig, gmres};
//!
//! let a = DiagonalOperator::new(vec![2.0, 3.0, 4.0]);
//! let b = vec![2.0, 3.0, 4.0];
//!
//! let (x, stats) = gmres(&a, &b, &GmresConfig::default()).unwrap();
//! assert!(stats.solved);
//! for xi in &x {
//!     assert!((xi - 1.0_f64).abs() < 1e-8);
//! }
//! ```

pub use krylite_core::{
    DiagonalOperator, FnOperator, LinearOperator, Scalar, apply_mul_or_div, operator, scalar,
    vecops,
};
pub use krylite_solver::{
    CgLanczosCallback, CgLanczosConfig, CgLanczosWorkspace, Error, GmresCallback, GmresConfig,
    GmresWorkspace, LanczosStats, Result, SimpleStats, SolverStatus, SparseComplexOperator,
    SparseOperator, cg_lanczos, cg_lanczos_warm, gmres, gmres_warm, sym_givens,
};
