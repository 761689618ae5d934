//! Eigenvalues, eigenvectors and convergence status

use crate::LinalgError;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A real or complex eigenvalue
///
/// Consumers match on the variant; there is no implicit truncation of a
/// complex value to its real part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Eigenvalue {
    Real(f64),
    Complex(Complex64),
}

impl Eigenvalue {
    /// Collapse a complex number with negligible imaginary part to `Real`
    pub fn from_complex(z: Complex64, threshold: f64) -> Self {
        if z.im.abs() < threshold {
            Eigenvalue::Real(z.re)
        } else {
            Eigenvalue::Complex(z)
        }
    }

    pub fn re(&self) -> f64 {
        match self {
            Eigenvalue::Real(x) => *x,
            Eigenvalue::Complex(z) => z.re,
        }
    }

    pub fn im(&self) -> f64 {
        match self {
            Eigenvalue::Real(_) => 0.0,
            Eigenvalue::Complex(z) => z.im,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Eigenvalue::Real(_))
    }

    pub fn to_complex(&self) -> Complex64 {
        match self {
            Eigenvalue::Real(x) => Complex64::new(*x, 0.0),
            Eigenvalue::Complex(z) => *z,
        }
    }

    /// Real value, or `ComplexEigenvaluesUnsupported` for a complex one
    pub fn try_real(&self) -> Result<f64, LinalgError> {
        match self {
            Eigenvalue::Real(x) => Ok(*x),
            Eigenvalue::Complex(z) => Err(LinalgError::ComplexEigenvaluesUnsupported {
                re: z.re,
                im: z.im.abs(),
            }),
        }
    }

    pub fn modulus(&self) -> f64 {
        match self {
            Eigenvalue::Real(x) => x.abs(),
            Eigenvalue::Complex(z) => z.norm(),
        }
    }

    pub fn approx_eq(&self, other: &Eigenvalue, tolerance: f64) -> bool {
        (self.to_complex() - other.to_complex()).norm() < tolerance
    }
}

impl From<f64> for Eigenvalue {
    fn from(x: f64) -> Self {
        Eigenvalue::Real(x)
    }
}

impl fmt::Display for Eigenvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eigenvalue::Real(x) => write!(f, "{}", x),
            Eigenvalue::Complex(z) if z.im < 0.0 => write!(f, "{}-{}i", z.re, -z.im),
            Eigenvalue::Complex(z) => write!(f, "{}+{}i", z.re, z.im),
        }
    }
}

/// An eigenvector, real or complex to match its eigenvalue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Eigenvector {
    Real(Vec<f64>),
    Complex(Vec<Complex64>),
}

impl Eigenvector {
    pub fn len(&self) -> usize {
        match self {
            Eigenvector::Real(v) => v.len(),
            Eigenvector::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every component is within `threshold` of zero
    pub fn is_zero(&self, threshold: f64) -> bool {
        match self {
            Eigenvector::Real(v) => v.iter().all(|x| x.abs() < threshold),
            Eigenvector::Complex(v) => v.iter().all(|z| z.norm() < threshold),
        }
    }

    /// Member of the eigenvector family `t·v` for the caller's parameter `t`
    pub fn scaled(&self, t: f64) -> Eigenvector {
        match self {
            Eigenvector::Real(v) => Eigenvector::Real(v.iter().map(|x| x * t).collect()),
            Eigenvector::Complex(v) => Eigenvector::Complex(v.iter().map(|&z| z * t).collect()),
        }
    }

    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Eigenvector::Real(v) => Some(v),
            Eigenvector::Complex(_) => None,
        }
    }

    pub fn to_complex(&self) -> Vec<Complex64> {
        match self {
            Eigenvector::Real(v) => v.iter().map(|&x| Complex64::new(x, 0.0)).collect(),
            Eigenvector::Complex(v) => v.clone(),
        }
    }
}

/// Outcome of an iterative solver
///
/// `Exhausted` is advisory: the best available approximation is still
/// returned alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Convergence {
    Converged { iterations: usize },
    Exhausted { iterations: usize, residual: f64 },
}

impl Convergence {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }

    pub fn iterations(&self) -> usize {
        match self {
            Convergence::Converged { iterations } | Convergence::Exhausted { iterations, .. } => *iterations,
        }
    }
}
