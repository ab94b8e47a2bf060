//! Linear operator contract.
//!
//! Solvers drive the system exclusively through operator-vector products, so
//! `A` can be a sparse matrix, a matrix-free callable, or a preconditioner
//! factorisation. A single trait covers all of them; there is no operator
//! hierarchy.

use std::marker::PhantomData;

use crate::scalar::Scalar;

/// A linear operator `Op: FCⁿ -> FCᵐ` applied through products.
///
/// The solver never owns or mutates the operator. The `symmetric` /
/// `hermitian` flags are trusted as stated by the caller: a method that
/// requires Hermitian `A` produces undefined numerical results (but no
/// unsafety) when the flag is wrong.
///
/// Transpose, adjoint, and division-based application are optional; the
/// defaults panic, which makes calling them on an operator that never
/// promised them a programmer error caught at the first use.
pub trait LinearOperator<FC: Scalar>: Send + Sync {
    /// Number of rows `m`.
    fn nrows(&self) -> usize;

    /// Number of columns `n`.
    fn ncols(&self) -> usize;

    /// Whether `Op` is symmetric (`Opᵀ = Op`).
    fn symmetric(&self) -> bool {
        false
    }

    /// Whether `Op` is Hermitian (`Opᴴ = Op`; implies square).
    fn hermitian(&self) -> bool {
        false
    }

    /// When true, the operator models `P⁻¹` through [`LinearOperator::solve`]
    /// (left-division) rather than through multiplication.
    fn uses_division(&self) -> bool {
        false
    }

    /// `y <- Op * x`.
    fn apply(&self, x: &[FC], y: &mut [FC]);

    /// `y <- Opᵀ * x`.
    fn apply_transpose(&self, _x: &[FC], _y: &mut [FC]) {
        unimplemented!("operator does not provide transpose application")
    }

    /// `y <- Opᴴ * x`.
    fn apply_adjoint(&self, _x: &[FC], _y: &mut [FC]) {
        unimplemented!("operator does not provide adjoint application")
    }

    /// `y <- Op⁻¹ * x` (division-based application, e.g. a factorisation).
    fn solve(&self, _x: &[FC], _y: &mut [FC]) {
        unimplemented!("operator does not provide division-based application")
    }
}

/// Apply a preconditioner through multiplication or left-division.
///
/// Division is taken when the per-solve `ldiv` option or the operator's own
/// [`LinearOperator::uses_division`] flag requests it.
#[inline]
pub fn apply_mul_or_div<FC: Scalar>(
    op: &dyn LinearOperator<FC>,
    x: &[FC],
    y: &mut [FC],
    ldiv: bool,
) {
    if ldiv || op.uses_division() {
        op.solve(x, y);
    } else {
        op.apply(x, y);
    }
}

/// A matrix-free operator built from a closure.
pub struct FnOperator<FC, F> {
    nrows: usize,
    ncols: usize,
    symmetric: bool,
    hermitian: bool,
    apply: F,
    _marker: PhantomData<FC>,
}

impl<FC, F> FnOperator<FC, F>
where
    FC: Scalar,
    F: Fn(&[FC], &mut [FC]) + Send + Sync,
{
    /// Wrap a closure computing `y <- Op * x`.
    pub fn new(nrows: usize, ncols: usize, apply: F) -> Self {
        Self {
            nrows,
            ncols,
            symmetric: false,
            hermitian: false,
            apply,
            _marker: PhantomData,
        }
    }

    /// Declare the operator symmetric.
    pub fn assume_symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    /// Declare the operator Hermitian.
    pub fn assume_hermitian(mut self) -> Self {
        self.hermitian = true;
        self
    }
}

impl<FC, F> LinearOperator<FC> for FnOperator<FC, F>
where
    FC: Scalar,
    F: Fn(&[FC], &mut [FC]) + Send + Sync,
{
    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn symmetric(&self) -> bool {
        self.symmetric
    }

    fn hermitian(&self) -> bool {
        self.hermitian
    }

    fn apply(&self, x: &[FC], y: &mut [FC]) {
        (self.apply)(x, y);
    }
}

/// A diagonal operator.
///
/// Multiplies by the stored diagonal in [`LinearOperator::apply`] and divides
/// by it in [`LinearOperator::solve`], so the same object serves as a scaling
/// matrix or as a division-based preconditioner.
pub struct DiagonalOperator<FC: Scalar> {
    diag: Vec<FC>,
    uses_division: bool,
}

impl<FC: Scalar> DiagonalOperator<FC> {
    /// Operator multiplying by `diag`.
    pub fn new(diag: Vec<FC>) -> Self {
        Self {
            diag,
            uses_division: false,
        }
    }

    /// Jacobi preconditioner `diag(A)⁻¹` built from the diagonal of `A`.
    ///
    /// Near-zero entries are passed through unscaled instead of inverted.
    pub fn jacobi(diag: &[FC]) -> Self {
        let tiny = FC::eps() * FC::eps();
        let inv_diag = diag
            .iter()
            .map(|&d| if d.abs() <= tiny { FC::one() } else { FC::one() / d })
            .collect();
        Self {
            diag: inv_diag,
            uses_division: false,
        }
    }

    /// Expose the operator through left-division: solvers will call
    /// [`LinearOperator::solve`] instead of [`LinearOperator::apply`].
    pub fn with_division(mut self) -> Self {
        self.uses_division = true;
        self
    }

    /// The stored diagonal.
    pub fn diagonal(&self) -> &[FC] {
        &self.diag
    }
}

impl<FC: Scalar> LinearOperator<FC> for DiagonalOperator<FC> {
    fn nrows(&self) -> usize {
        self.diag.len()
    }

    fn ncols(&self) -> usize {
        self.diag.len()
    }

    fn symmetric(&self) -> bool {
        true
    }

    fn uses_division(&self) -> bool {
        self.uses_division
    }

    fn apply(&self, x: &[FC], y: &mut [FC]) {
        assert_eq!(x.len(), self.diag.len());
        assert_eq!(y.len(), self.diag.len());
        for ((yi, &xi), &di) in y.iter_mut().zip(x.iter()).zip(self.diag.iter()) {
            *yi = di * xi;
        }
    }

    fn apply_transpose(&self, x: &[FC], y: &mut [FC]) {
        self.apply(x, y);
    }

    fn apply_adjoint(&self, x: &[FC], y: &mut [FC]) {
        assert_eq!(x.len(), self.diag.len());
        assert_eq!(y.len(), self.diag.len());
        for ((yi, &xi), &di) in y.iter_mut().zip(x.iter()).zip(self.diag.iter()) {
            *yi = di.conj() * xi;
        }
    }

    fn solve(&self, x: &[FC], y: &mut [FC]) {
        assert_eq!(x.len(), self.diag.len());
        assert_eq!(y.len(), self.diag.len());
        for ((yi, &xi), &di) in y.iter_mut().zip(x.iter()).zip(self.diag.iter()) {
            *yi = xi / di;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    #[test]
    fn fn_operator_applies_closure() {
        let op = FnOperator::new(3, 3, |x: &[f64], y: &mut [f64]| {
            for (yi, xi) in y.iter_mut().zip(x.iter()) {
                *yi = 2.0 * xi;
            }
        })
        .assume_symmetric();

        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![0.0; 3];
        op.apply(&x, &mut y);
        assert_eq!(y, vec![2.0, 4.0, 6.0]);
        assert!(op.symmetric());
        assert!(!op.hermitian());
    }

    #[test]
    fn diagonal_apply_and_solve_are_inverse() {
        let op = DiagonalOperator::new(vec![2.0, 4.0, 5.0]);
        let x = vec![2.0, 8.0, 10.0];
        let mut y = vec![0.0; 3];
        let mut z = vec![0.0; 3];

        op.apply(&x, &mut y);
        assert_eq!(y, vec![4.0, 32.0, 50.0]);
        op.solve(&y, &mut z);
        for (zi, xi) in z.iter().zip(x.iter()) {
            assert!((zi - xi).abs() < 1e-14);
        }
    }

    #[test]
    fn jacobi_inverts_diagonal() {
        let precond = DiagonalOperator::jacobi(&[2.0, 4.0, 5.0]);
        let x = vec![2.0, 8.0, 10.0];
        let mut y = vec![0.0; 3];
        precond.apply(&x, &mut y);
        assert!((y[0] - 1.0).abs() < 1e-15);
        assert!((y[1] - 2.0).abs() < 1e-15);
        assert!((y[2] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn jacobi_passes_zero_diagonal_through() {
        let precond = DiagonalOperator::jacobi(&[0.0, 2.0]);
        let x = vec![5.0, 4.0];
        let mut y = vec![0.0; 2];
        precond.apply(&x, &mut y);
        assert!((y[0] - 5.0).abs() < 1e-15);
        assert!((y[1] - 2.0).abs() < 1e-15);
    }

    #[test]
    fn mul_or_div_respects_flags() {
        let mul = DiagonalOperator::new(vec![2.0, 2.0]);
        let div = DiagonalOperator::new(vec![2.0, 2.0]).with_division();
        let x = vec![4.0, 4.0];
        let mut y = vec![0.0; 2];

        apply_mul_or_div(&mul, &x, &mut y, false);
        assert_eq!(y, vec![8.0, 8.0]);
        apply_mul_or_div(&div, &x, &mut y, false);
        assert_eq!(y, vec![2.0, 2.0]);
        apply_mul_or_div(&mul, &x, &mut y, true);
        assert_eq!(y, vec![2.0, 2.0]);
    }

    #[test]
    fn diagonal_adjoint_conjugates() {
        let op = DiagonalOperator::new(vec![C64::new(0.0, 2.0)]);
        let x = vec![C64::new(1.0, 0.0)];
        let mut y = vec![C64::new(0.0, 0.0)];
        op.apply_adjoint(&x, &mut y);
        assert!((y[0] - C64::new(0.0, -2.0)).norm() < 1e-15);
    }
}
