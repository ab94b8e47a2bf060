//! Sparse matrix operators.
//!
//! Wrappers implementing [`LinearOperator`] for faer's sparse column
//! matrices, so callers can hand the solvers a matrix instead of a closure.
//! The matrix is only ever used through products; no factorisation happens
//! here.

use faer::prelude::*;
use faer::sparse::{SparseColMat, Triplet};
use krylite_core::LinearOperator;
use num_complex::Complex64 as C64;

/// Sparse real-valued operator.
pub struct SparseOperator {
    matrix: SparseColMat<usize, f64>,
    symmetric: bool,
}

impl SparseOperator {
    /// Wrap an existing sparse matrix.
    pub fn from_matrix(matrix: SparseColMat<usize, f64>) -> Self {
        Self {
            matrix,
            symmetric: false,
        }
    }

    /// Build from `(row, col, value)` triplets.
    ///
    /// Duplicate entries at the same position are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Option<Self> {
        let faer_triplets: Vec<_> = triplets
            .iter()
            .map(|&(r, c, v)| Triplet::new(r, c, v))
            .collect();

        SparseColMat::<usize, f64>::try_new_from_triplets(nrows, ncols, &faer_triplets)
            .ok()
            .map(Self::from_matrix)
    }

    /// Declare the matrix symmetric.
    pub fn assume_symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &SparseColMat<usize, f64> {
        &self.matrix
    }
}

impl LinearOperator<f64> for SparseOperator {
    fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    fn symmetric(&self) -> bool {
        self.symmetric
    }

    fn hermitian(&self) -> bool {
        self.symmetric
    }

    fn apply(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.matrix.ncols());
        assert_eq!(y.len(), self.matrix.nrows());

        y.iter_mut().for_each(|yi| *yi = 0.0);

        // CSC product: for each column j, add A[:, j] * x[j] to y.
        let mat_ref = self.matrix.as_ref();
        let col_ptrs = mat_ref.col_ptr();
        let row_indices = mat_ref.row_idx();
        let values = mat_ref.val();

        for j in 0..self.matrix.ncols() {
            let xj = x[j];
            for idx in col_ptrs[j]..col_ptrs[j + 1] {
                y[row_indices[idx]] += values[idx] * xj;
            }
        }
    }

    fn apply_transpose(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.matrix.nrows());
        assert_eq!(y.len(), self.matrix.ncols());

        let mat_ref = self.matrix.as_ref();
        let col_ptrs = mat_ref.col_ptr();
        let row_indices = mat_ref.row_idx();
        let values = mat_ref.val();

        for j in 0..self.matrix.ncols() {
            let mut acc = 0.0;
            for idx in col_ptrs[j]..col_ptrs[j + 1] {
                acc += values[idx] * x[row_indices[idx]];
            }
            y[j] = acc;
        }
    }

    fn apply_adjoint(&self, x: &[f64], y: &mut [f64]) {
        self.apply_transpose(x, y);
    }
}

/// Sparse complex-valued operator.
pub struct SparseComplexOperator {
    matrix: SparseColMat<usize, c64>,
    hermitian: bool,
}

impl SparseComplexOperator {
    /// Wrap an existing sparse matrix.
    pub fn from_matrix(matrix: SparseColMat<usize, c64>) -> Self {
        Self {
            matrix,
            hermitian: false,
        }
    }

    /// Build from `(row, col, value)` triplets.
    ///
    /// Duplicate entries at the same position are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: &[(usize, usize, C64)],
    ) -> Option<Self> {
        let faer_triplets: Vec<_> = triplets
            .iter()
            .map(|&(r, c, v)| Triplet::new(r, c, c64::new(v.re, v.im)))
            .collect();

        SparseColMat::<usize, c64>::try_new_from_triplets(nrows, ncols, &faer_triplets)
            .ok()
            .map(Self::from_matrix)
    }

    /// Declare the matrix Hermitian.
    pub fn assume_hermitian(mut self) -> Self {
        self.hermitian = true;
        self
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &SparseColMat<usize, c64> {
        &self.matrix
    }
}

impl LinearOperator<C64> for SparseComplexOperator {
    fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    fn hermitian(&self) -> bool {
        self.hermitian
    }

    fn apply(&self, x: &[C64], y: &mut [C64]) {
        assert_eq!(x.len(), self.matrix.ncols());
        assert_eq!(y.len(), self.matrix.nrows());

        y.iter_mut().for_each(|yi| *yi = C64::new(0.0, 0.0));

        let mat_ref = self.matrix.as_ref();
        let col_ptrs = mat_ref.col_ptr();
        let row_indices = mat_ref.row_idx();
        let values = mat_ref.val();

        for j in 0..self.matrix.ncols() {
            let xj = x[j];
            for idx in col_ptrs[j]..col_ptrs[j + 1] {
                let aij = values[idx];
                y[row_indices[idx]] += C64::new(aij.re, aij.im) * xj;
            }
        }
    }

    fn apply_transpose(&self, x: &[C64], y: &mut [C64]) {
        assert_eq!(x.len(), self.matrix.nrows());
        assert_eq!(y.len(), self.matrix.ncols());

        let mat_ref = self.matrix.as_ref();
        let col_ptrs = mat_ref.col_ptr();
        let row_indices = mat_ref.row_idx();
        let values = mat_ref.val();

        for j in 0..self.matrix.ncols() {
            let mut acc = C64::new(0.0, 0.0);
            for idx in col_ptrs[j]..col_ptrs[j + 1] {
                let aij = values[idx];
                acc += C64::new(aij.re, aij.im) * x[row_indices[idx]];
            }
            y[j] = acc;
        }
    }

    fn apply_adjoint(&self, x: &[C64], y: &mut [C64]) {
        assert_eq!(x.len(), self.matrix.nrows());
        assert_eq!(y.len(), self.matrix.ncols());

        let mat_ref = self.matrix.as_ref();
        let col_ptrs = mat_ref.col_ptr();
        let row_indices = mat_ref.row_idx();
        let values = mat_ref.val();

        for j in 0..self.matrix.ncols() {
            let mut acc = C64::new(0.0, 0.0);
            for idx in col_ptrs[j]..col_ptrs[j + 1] {
                let aij = values[idx];
                acc += C64::new(aij.re, -aij.im) * x[row_indices[idx]];
            }
            y[j] = acc;
        }
    }
}
