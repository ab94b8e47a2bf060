//! Uniform scalar arithmetic over real and complex floating types.
//!
//! Solver kernels are generic over a scalar `FC` that is either a real
//! floating type `T` or `Complex<T>`. Quantities that are real by
//! construction (norms, Rayleigh quotients of Hermitian operators, residual
//! estimates) are kept in the associated [`Scalar::Real`] type and never
//! round-trip through `FC`.

use std::fmt::{Debug, Display};
use std::ops::Neg;

use num_complex::Complex;
use num_traits::{Float, Num, NumAssign};

/// A real or complex floating-point scalar.
///
/// Implemented for `f32`, `f64`, and `Complex<T>` for any base float `T`
/// satisfying the [`Scalar::Real`] bounds, which is how higher-precision
/// float types slot in.
pub trait Scalar:
    Copy + PartialEq + Debug + Display + Num + NumAssign + Neg<Output = Self> + Send + Sync + 'static
{
    /// The underlying real type (`T` for both `T` and `Complex<T>`).
    type Real: Float + NumAssign + Debug + Display + Send + Sync + 'static;

    /// Embed a real value.
    fn from_real(r: Self::Real) -> Self;

    /// Real part.
    fn real(self) -> Self::Real;

    /// Complex conjugate (identity for real scalars).
    fn conj(self) -> Self;

    /// Modulus `|x|`.
    fn abs(self) -> Self::Real;

    /// Squared modulus `|x|²`.
    fn abs2(self) -> Self::Real;

    /// Principal square root.
    fn sqrt(self) -> Self;

    /// Multiply by a real scalar.
    fn mul_real(self, r: Self::Real) -> Self;

    /// Divide by a real scalar.
    fn div_real(self, r: Self::Real) -> Self;

    /// Machine epsilon of the base real type.
    fn eps() -> Self::Real {
        Self::Real::epsilon()
    }
}

macro_rules! impl_real_scalar {
    ($t:ty) => {
        impl Scalar for $t {
            type Real = $t;

            fn from_real(r: $t) -> Self {
                r
            }

            fn real(self) -> $t {
                self
            }

            fn conj(self) -> Self {
                self
            }

            fn abs(self) -> $t {
                <$t>::abs(self)
            }

            fn abs2(self) -> $t {
                self * self
            }

            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            fn mul_real(self, r: $t) -> Self {
                self * r
            }

            fn div_real(self, r: $t) -> Self {
                self / r
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);

impl<T> Scalar for Complex<T>
where
    T: Float + NumAssign + Debug + Display + Send + Sync + 'static,
{
    type Real = T;

    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }

    fn real(self) -> T {
        self.re
    }

    fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    fn abs(self) -> T {
        self.norm()
    }

    fn abs2(self) -> T {
        self.norm_sqr()
    }

    fn sqrt(self) -> Self {
        Complex::sqrt(self)
    }

    fn mul_real(self, r: T) -> Self {
        self.scale(r)
    }

    fn div_real(self, r: T) -> Self {
        self.unscale(r)
    }
}
