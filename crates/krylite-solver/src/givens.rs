//! Numerically stable Givens reflections.

use krylite_core::Scalar;
use num_traits::{Float, One, Zero};

/// Compute a symmetric Givens reflection `(c, s, rho)` such that
///
/// ```text
/// [ c        s ] [ a ]   [ rho ]
/// [ conj(s) -c ] [ b ] = [ 0   ]
/// ```
///
/// with real `c`, `c² + |s|² = 1`, `|rho|² = |a|² + |b|²`, and `rho >= 0`
/// whenever both inputs are real (the `slartg` sign convention).
///
/// The reflection is built from the magnitude ratio of `a` and `b`, so no
/// intermediate square can overflow before the square root, and the
/// degenerate inputs `a = 0`, `b = 0` produce exact unit reflections rather
/// than NaNs. One code path serves real and complex scalars.
pub fn sym_givens<FC: Scalar>(a: FC, b: FC) -> (FC::Real, FC, FC) {
    let one = FC::Real::one();
    let abs_a = a.abs();
    let abs_b = b.abs();

    let (c, s, rho) = if abs_b == FC::Real::zero() {
        (one, FC::zero(), a)
    } else if abs_a == FC::Real::zero() {
        (FC::Real::zero(), FC::one(), b)
    } else if abs_b > abs_a {
        let t = abs_a / abs_b;
        let c = one / (one + t * t).sqrt();
        let phase = b.div_real(abs_b) / a.div_real(abs_a);
        let s = phase.conj().mul_real(c);
        let rho = b / s.conj();
        (c * t, s, rho)
    } else {
        let t = abs_b / abs_a;
        let c = one / (one + t * t).sqrt();
        let phase = b.div_real(abs_b) / a.div_real(abs_a);
        let s = phase.conj().mul_real(c * t);
        let rho = a.div_real(c);
        (c, s, rho)
    };

    // Negating c, s, and rho together is the same reflection, so a rho on
    // the negative real axis is folded back to rho >= 0.
    if rho == FC::from_real(rho.real()) && rho.real() < FC::Real::zero() {
        (-c, -s, -rho)
    } else {
        (c, s, rho)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    fn check_real(a: f64, b: f64) {
        let (c, s, rho) = sym_givens(a, b);
        // real inputs always map onto a nonnegative rho
        assert!(rho >= 0.0);
        // unit reflection
        assert!((c * c + s * s - 1.0).abs() < 1e-14);
        // magnitude preserved
        assert!((rho * rho - (a * a + b * b)).abs() < 1e-12 * (1.0 + a * a + b * b));
        // second component zeroed
        assert!((s * a - c * b).abs() < 1e-12 * (1.0 + a.abs() + b.abs()));
        // first component mapped onto rho
        assert!((c * a + s * b - rho).abs() < 1e-12 * (1.0 + rho.abs()));
    }

    fn check_complex(a: C64, b: C64) {
        let (c, s, rho) = sym_givens(a, b);
        assert!((c * c + s.norm_sqr() - 1.0).abs() < 1e-14);
        assert!((rho.norm_sqr() - (a.norm_sqr() + b.norm_sqr())).abs() < 1e-12);
        let lower = Scalar::conj(s) * a - b.scale(c);
        assert!(lower.norm() < 1e-12);
        let upper = a.scale(c) + s * b - rho;
        assert!(upper.norm() < 1e-12);
    }

    #[test]
    fn real_pairs() {
        check_real(3.0, 4.0);
        check_real(4.0, 3.0);
        check_real(-3.0, 4.0);
        check_real(3.0, -4.0);
        check_real(1e-200, 1e-200);
    }

    #[test]
    fn degenerate_inputs_are_nan_free() {
        let (c, s, rho) = sym_givens(0.0f64, 0.0);
        assert_eq!((c, s, rho), (1.0, 0.0, 0.0));

        let (c, s, rho) = sym_givens(5.0f64, 0.0);
        assert_eq!((c, s, rho), (1.0, 0.0, 5.0));

        let (c, s, rho) = sym_givens(0.0f64, 5.0);
        assert_eq!((c, s, rho), (0.0, 1.0, 5.0));

        let (c, s, rho) = sym_givens(-5.0f64, 0.0);
        assert_eq!((c, s, rho), (-1.0, 0.0, 5.0));

        let (c, s, rho) = sym_givens(0.0f64, -5.0);
        assert_eq!((c, s, rho), (0.0, -1.0, 5.0));
    }

    #[test]
    fn negative_real_leading_entry_keeps_rho_nonnegative() {
        let (c, s, rho) = sym_givens(-3.0f64, 4.0);
        assert_eq!(rho, 5.0);
        assert!((c + 0.6).abs() < 1e-15);
        assert!((s - 0.8).abs() < 1e-15);
    }

    #[test]
    fn complex_pairs() {
        check_complex(C64::new(3.0, -4.0), C64::new(1.0, 2.0));
        check_complex(C64::new(0.1, 0.2), C64::new(-5.0, 1.0));
        check_complex(C64::new(0.0, 1.0), C64::new(1.0, 0.0));
        check_complex(C64::new(2.0, 0.0), C64::new(0.0, -3.0));
    }

    #[test]
    fn complex_degenerate_keeps_phase() {
        let a = C64::new(0.0, -2.0);
        let (c, s, rho) = sym_givens(a, C64::new(0.0, 0.0));
        assert_eq!(c, 1.0);
        assert_eq!(s, C64::new(0.0, 0.0));
        assert_eq!(rho, a);
    }

    #[test]
    fn large_magnitudes_do_not_overflow() {
        let (c, s, rho) = sym_givens(1e300f64, 1e300);
        assert!(c.is_finite());
        assert!(s.is_finite());
        assert!(rho.is_finite());
    }
}
