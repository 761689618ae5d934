//! Closed-form eigenvalues for 2×2 and 3×3 matrices
//!
//! A 2×2 matrix is solved from its trace and determinant. A 3×3 matrix is
//! reduced to its characteristic cubic and handed to the root finder, so only
//! its real eigenvalues are found.

use spectra_core::{Complex64, Convergence, Eigenvalue, LinalgError, Matrix, SolverConfig, SpectraError, Value};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use tracing::debug;
use crate::helpers::{check_arg_count, into_value, matrix_arg};
use crate::ops::trace;
use crate::roots::{self, Cubic, RootSet};

/// Eigenvalues from the closed-form path
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticEigenvalues {
    pub eigenvalues: Vec<Eigenvalue>,
    /// Always `Converged` for 2×2; the root finder's status for 3×3
    pub convergence: Convergence,
}

/// Both eigenvalues of a 2×2 matrix, larger (or positive-imaginary) first
pub fn eigenvalues_2x2(a: &Matrix, config: &SolverConfig) -> [Eigenvalue; 2] {
    let tr = trace(a);
    let det = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)];
    let mut disc = tr * tr - 4.0 * det;
    if disc.abs() < config.zero_threshold {
        disc = 0.0;
    }

    if disc >= 0.0 {
        let root = disc.sqrt();
        [Eigenvalue::Real((tr + root) / 2.0), Eigenvalue::Real((tr - root) / 2.0)]
    } else {
        let im = (-disc).sqrt() / 2.0;
        let re = tr / 2.0;
        [
            Eigenvalue::Complex(Complex64::new(re, im)),
            Eigenvalue::Complex(Complex64::new(re, -im)),
        ]
    }
}

/// `(c2, c1, det)`: trace, sum of principal 2×2 minors, determinant
pub fn invariants_3x3(a: &Matrix) -> (f64, f64, f64) {
    let c2 = trace(a);
    let c1 = a[(0, 0)] * a[(1, 1)] - a[(0, 1)] * a[(1, 0)]
        + a[(0, 0)] * a[(2, 2)] - a[(0, 2)] * a[(2, 0)]
        + a[(1, 1)] * a[(2, 2)] - a[(1, 2)] * a[(2, 1)];
    let det = a[(0, 0)] * (a[(1, 1)] * a[(2, 2)] - a[(1, 2)] * a[(2, 1)])
        - a[(0, 1)] * (a[(1, 0)] * a[(2, 2)] - a[(1, 2)] * a[(2, 0)])
        + a[(0, 2)] * (a[(1, 0)] * a[(2, 1)] - a[(1, 1)] * a[(2, 0)]);
    (c2, c1, det)
}

/// Distinct real eigenvalues of a 3×3 matrix, descending
pub fn eigenvalues_3x3(a: &Matrix, config: &SolverConfig) -> RootSet {
    let (c2, c1, det) = invariants_3x3(a);
    debug!(c2, c1, det, "characteristic polynomial");
    roots::solve(&Cubic::characteristic(c2, c1, det), config)
}

/// Dispatch on dimension; only 2×2 and 3×3 are supported
pub fn analytic_eigenvalues(a: &Matrix, config: &SolverConfig) -> Result<AnalyticEigenvalues, LinalgError> {
    match a.require_square("eigenvalues")? {
        2 => Ok(AnalyticEigenvalues {
            eigenvalues: eigenvalues_2x2(a, config).to_vec(),
            convergence: Convergence::Converged { iterations: 0 },
        }),
        3 => {
            let RootSet { roots, convergence } = eigenvalues_3x3(a, config);
            Ok(AnalyticEigenvalues {
                eigenvalues: roots.into_iter().map(Eigenvalue::Real).collect(),
                convergence,
            })
        }
        n => Err(LinalgError::UnsupportedDimension {
            op: "eigenvalues",
            n,
            supported: "2 or 3",
        }),
    }
}

/// Real eigenvalues only; a complex pair is an error, never truncated
pub fn analytic_real_eigenvalues(a: &Matrix, config: &SolverConfig) -> Result<Vec<f64>, LinalgError> {
    analytic_eigenvalues(a, config)?
        .eigenvalues
        .iter()
        .map(Eigenvalue::try_real)
        .collect()
}

// ============================================================================
// EIGENVALUES - Closed-form eigenvalues (complex-capable)
// ============================================================================

pub struct EigenvaluesFn;

static EIGENVALUES_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "2×2 or 3×3 matrix")];
static EIGENVALUES_EXAMPLES: [&str; 2] = [
    "eigenvalues([[2, 0], [0, 3]]) → {eigenvalues: [3, 2]}",
    "eigenvalues([[0, -1], [1, 0]]) → {eigenvalues: [i, -i]}",
];
static EIGENVALUES_RELATED: [&str; 3] = ["eigenvalues_real", "qr_eigenvalues", "eigen"];

impl FunctionPlugin for EigenvaluesFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "eigenvalues",
            description: "Eigenvalues of a 2×2 or 3×3 matrix in closed form",
            usage: "eigenvalues(matrix)",
            args: &EIGENVALUES_ARGS,
            returns: "Object",
            examples: &EIGENVALUES_EXAMPLES,
            category: "eigen",
            related: &EIGENVALUES_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl EigenvaluesFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "eigenvalues", 1, 1)?;
        let a = matrix_arg(args, 0, "eigenvalues")?;
        let AnalyticEigenvalues { eigenvalues, convergence } = analytic_eigenvalues(&a, &ctx.config)
            .map_err(|e| SpectraError::from(e).in_function("eigenvalues"))?;

        let values = eigenvalues.into_iter().map(Value::from).collect();
        Ok(crate::with_convergence(
            vec![("eigenvalues", Value::List(values))],
            "eigenvalues",
            convergence,
        ))
    }
}

// ============================================================================
// EIGENVALUES_REAL - Closed-form eigenvalues, real only
// ============================================================================

pub struct EigenvaluesRealFn;

static EIGENVALUES_REAL_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "2×2 or 3×3 matrix")];
static EIGENVALUES_REAL_EXAMPLES: [&str; 1] = ["eigenvalues_real([[4, 1, 0], [0, 3, 0], [0, 0, 2]]) → [4, 3, 2]"];
static EIGENVALUES_REAL_RELATED: [&str; 1] = ["eigenvalues"];

impl FunctionPlugin for EigenvaluesRealFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "eigenvalues_real",
            description: "Real eigenvalues of a 2×2 or 3×3 matrix; fails on a complex pair",
            usage: "eigenvalues_real(matrix)",
            args: &EIGENVALUES_REAL_ARGS,
            returns: "List",
            examples: &EIGENVALUES_REAL_EXAMPLES,
            category: "eigen",
            related: &EIGENVALUES_REAL_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl EigenvaluesRealFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "eigenvalues_real", 1, 1)?;
        let a = matrix_arg(args, 0, "eigenvalues_real")?;
        let values = analytic_real_eigenvalues(&a, &ctx.config)
            .map_err(|e| SpectraError::from(e).in_function("eigenvalues_real"))?;
        Ok(Value::from(values))
    }
}
