//! Core abstractions shared by the krylite iterative solvers.
//!
//! This crate provides the three building blocks every Krylov method is
//! assembled from:
//!
//! - [`Scalar`] - a uniform contract over real and complex floating scalars,
//!   with the base real type exposed as an associated type.
//! - [`vecops`] - in-place BLAS-level vector kernels (`axpy`, `dot`, `nrm2`, ...).
//! - [`LinearOperator`] - the polymorphic operator contract: solvers only ever
//!   see `y = A * x` products, never the matrix itself.

pub mod operator;
pub mod scalar;
pub mod vecops;

pub use operator::{DiagonalOperator, FnOperator, LinearOperator, apply_mul_or_div};
pub use scalar::Scalar;
