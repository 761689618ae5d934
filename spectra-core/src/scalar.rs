//! Scalar field abstraction
//!
//! The engine works over real `f64` entries, but a complex eigenvalue shifts
//! the matrix into complex arithmetic. Both fields implement [`Scalar`] so
//! products, norms and null-space recovery are written once.

use num_complex::Complex64;
use num_traits::Num;
use std::fmt::Debug;
use std::ops::Neg;

/// Numeric entry of a [`Matrix`](crate::Matrix) or vector
pub trait Scalar: Num + Neg<Output = Self> + Copy + Debug + Send + Sync + 'static {
    /// Absolute value (real) or modulus (complex)
    fn modulus(self) -> f64;

    /// Embed a real number
    fn from_real(x: f64) -> Self;

    /// Complex conjugate (identity for reals)
    fn conj(self) -> Self;

    /// Lift into the complex field
    fn to_complex(self) -> Complex64;

    /// True when the value is within `threshold` of zero
    fn is_negligible(self, threshold: f64) -> bool {
        self.modulus() < threshold
    }
}

impl Scalar for f64 {
    fn modulus(self) -> f64 {
        self.abs()
    }

    fn from_real(x: f64) -> Self {
        x
    }

    fn conj(self) -> Self {
        self
    }

    fn to_complex(self) -> Complex64 {
        Complex64::new(self, 0.0)
    }
}

impl Scalar for Complex64 {
    fn modulus(self) -> f64 {
        self.norm()
    }

    fn from_real(x: f64) -> Self {
        Complex64::new(x, 0.0)
    }

    fn conj(self) -> Self {
        Complex64::conj(&self)
    }

    fn to_complex(self) -> Complex64 {
        self
    }
}
