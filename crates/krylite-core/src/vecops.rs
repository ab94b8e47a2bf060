//! In-place vector kernels.
//!
//! BLAS-level primitives on contiguous slices. All of them run in a single
//! pass with no allocation, so they stay cheap to retarget at device kernels
//! when vectors live on an accelerator. Dot products are conjugate-linear in
//! the first argument.

use num_traits::{Float, Zero};

use crate::scalar::Scalar;

/// `y <- alpha * x + y`.
#[inline]
pub fn axpy<FC: Scalar>(alpha: FC, x: &[FC], y: &mut [FC]) {
    assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}

/// `y <- alpha * x + beta * y`.
#[inline]
pub fn axpby<FC: Scalar>(alpha: FC, x: &[FC], beta: FC, y: &mut [FC]) {
    assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = alpha * xi + beta * *yi;
    }
}

/// `x <- alpha * x`.
#[inline]
pub fn scal<FC: Scalar>(alpha: FC, x: &mut [FC]) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}

/// Conjugated dot product `sum(conj(x_i) * y_i)`.
#[inline]
pub fn dot<FC: Scalar>(x: &[FC], y: &[FC]) -> FC {
    assert_eq!(x.len(), y.len());
    let mut acc = FC::zero();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        acc += xi.conj() * yi;
    }
    acc
}

/// Real part of the conjugated dot product.
///
/// Used where the result is real by construction (e.g. `vᴴ M v` with
/// Hermitian `M`), so the imaginary round-off never leaks into the
/// recurrences.
#[inline]
pub fn dotr<FC: Scalar>(x: &[FC], y: &[FC]) -> FC::Real {
    assert_eq!(x.len(), y.len());
    let mut acc = FC::Real::zero();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        acc += (xi.conj() * yi).real();
    }
    acc
}

/// Euclidean norm `sqrt(sum |x_i|²)`.
#[inline]
pub fn nrm2<FC: Scalar>(x: &[FC]) -> FC::Real {
    let mut acc = FC::Real::zero();
    for &xi in x.iter() {
        acc += xi.abs2();
    }
    acc.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    #[test]
    fn axpy_real() {
        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![1.0, 1.0, 1.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn axpby_cancels() {
        let x = vec![1.0f32; 64];
        let mut y = vec![2.0f32; 64];
        axpby(2.0, &x, -1.0, &mut y);
        for yi in &y {
            assert!(yi.abs() < 1e-7);
        }
    }

    #[test]
    fn scal_complex() {
        let mut x = vec![C64::new(1.0, 1.0); 4];
        scal(C64::new(0.0, 1.0), &mut x);
        for xi in &x {
            assert!((xi - C64::new(-1.0, 1.0)).norm() < 1e-15);
        }
    }

    #[test]
    fn dot_is_conjugate_linear_in_first_argument() {
        let x = vec![C64::new(4.0, 3.0); 100];
        let y = vec![C64::new(2.0, -3.0); 100];
        let r = dot(&x, &y);
        let t = Scalar::conj(x[0]) * y[0] * C64::new(100.0, 0.0);
        assert!((r - t).norm() < 1e-10);
    }

    #[test]
    fn dotr_matches_real_part_of_dot() {
        let x = vec![C64::new(1.0, 2.0), C64::new(-3.0, 0.5)];
        let y = vec![C64::new(0.5, -1.0), C64::new(2.0, 2.0)];
        assert!((dotr(&x, &y) - dot(&x, &y).re).abs() < 1e-15);
    }

    #[test]
    fn nrm2_real_and_complex() {
        assert!((nrm2(&[3.0f64, 4.0]) - 5.0).abs() < 1e-15);
        assert!((nrm2(&[C64::new(3.0, 4.0)]) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn self_dotr_is_norm_squared() {
        let x = vec![C64::new(1.0, -2.0), C64::new(0.0, 3.0)];
        let n = nrm2(&x);
        assert!((dotr(&x, &x) - n * n).abs() < 1e-12);
    }
}
