//! Eigenvector recovery from the null space of `A − λI`
//!
//! Small matrices get a closed-form substitution on their first rows, larger
//! ones a single-row pivot heuristic. Every candidate is checked against
//! `A − λI`; one that does not annihilate it (a triangular pattern the
//! substitution cannot see, an inconsistent heuristic guess) is replaced by a
//! null vector from Gaussian elimination with complete pivoting.
//!
//! The recovered vector is one member of the family `t·v`; it is never the
//! zero vector.

use serde::{Deserialize, Serialize};
use spectra_core::{Eigenvalue, Eigenvector, LinalgError, Matrix, Scalar, SolverConfig, SpectraError, Value, Vector};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use std::fmt;
use tracing::debug;
use crate::helpers::{check_arg_count, extract_eigenvalue, into_value, matrix_arg};
use crate::ops::{apply, matrix_inf_norm, norm, shifted};

/// How a null vector was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMethod {
    /// Substitution on the first rows of a 2×2 or 3×3 system
    ClosedForm,
    /// One pivot row solved with every other coordinate set to 1 (n > 3)
    PivotHeuristic,
    /// Gaussian elimination with complete pivoting
    RowReduction,
    /// Elimination broke down; the last standard basis vector
    BasisFallback,
}

impl RecoveryMethod {
    /// False for guesses that only hold if the residual says so
    pub fn is_exact(&self) -> bool {
        matches!(self, RecoveryMethod::ClosedForm | RecoveryMethod::RowReduction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryMethod::ClosedForm => "closed_form",
            RecoveryMethod::PivotHeuristic => "pivot_heuristic",
            RecoveryMethod::RowReduction => "row_reduction",
            RecoveryMethod::BasisFallback => "basis_fallback",
        }
    }
}

impl fmt::Display for RecoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredVector {
    pub vector: Eigenvector,
    pub method: RecoveryMethod,
    /// `‖(A − λI)·v‖` for the returned vector
    pub residual: f64,
}

/// Recover an eigenvector of `a` for `lambda`.
///
/// A complex eigenvalue switches the whole computation to complex arithmetic
/// and yields a complex vector.
pub fn eigenvector(a: &Matrix, lambda: &Eigenvalue, config: &SolverConfig) -> Result<RecoveredVector, LinalgError> {
    match lambda {
        Eigenvalue::Real(x) => {
            let (v, method, residual) = null_vector(&shifted(a, *x)?, config)?;
            Ok(RecoveredVector { vector: Eigenvector::Real(v), method, residual })
        }
        Eigenvalue::Complex(z) => {
            let (v, method, residual) = null_vector(&shifted(&a.to_complex(), *z)?, config)?;
            Ok(RecoveredVector { vector: Eigenvector::Complex(v), method, residual })
        }
    }
}

/// Null vector of `b`, verified and refined when the first guess fails
pub fn null_vector<T: Scalar>(b: &Matrix<T>, config: &SolverConfig) -> Result<(Vector<T>, RecoveryMethod, f64), LinalgError> {
    let n = b.require_square("eigenvector")?;
    let zero = config.zero_threshold;

    let (candidate, method) = match n {
        2 => (closed_form_2x2(b, zero), RecoveryMethod::ClosedForm),
        3 => (closed_form_3x3(b, zero), RecoveryMethod::ClosedForm),
        _ => (pivot_heuristic(b, zero), RecoveryMethod::PivotHeuristic),
    };

    let scale = config.residual_tolerance * matrix_inf_norm(b).max(1.0);
    let residual = norm(&apply(b, &candidate)?);
    let size = norm(&candidate);
    if size > zero && candidate.iter().all(|x| x.modulus().is_finite()) && residual <= scale * size {
        return Ok((candidate, method, residual));
    }

    debug!(%method, residual, "candidate rejected, falling back to row reduction");
    match row_reduce(b, config.residual_tolerance) {
        Some(v) => {
            let residual = norm(&apply(b, &v)?);
            Ok((v, RecoveryMethod::RowReduction, residual))
        }
        None => {
            let mut e = vec![T::zero(); n];
            e[n - 1] = T::one();
            let residual = norm(&apply(b, &e)?);
            Ok((e, RecoveryMethod::BasisFallback, residual))
        }
    }
}

fn nonzero<T: Scalar>(x: T, threshold: f64) -> bool {
    !x.is_negligible(threshold)
}

fn closed_form_2x2<T: Scalar>(b: &Matrix<T>, zero: f64) -> Vector<T> {
    let one = T::one();
    let (b00, b01, b10, b11) = (b[(0, 0)], b[(0, 1)], b[(1, 0)], b[(1, 1)]);

    if nonzero(b01, zero) {
        vec![one, -b00 / b01]
    } else if nonzero(b00, zero) {
        vec![-b01 / b00, one]
    } else if nonzero(b11, zero) {
        vec![one, -b10 / b11]
    } else {
        vec![T::zero(), one]
    }
}

/// Solve the first two rows by substitution, fixing one coordinate to 1
fn closed_form_3x3<T: Scalar>(b: &Matrix<T>, zero: f64) -> Vector<T> {
    let one = T::one();
    let (b00, b01, b02) = (b[(0, 0)], b[(0, 1)], b[(0, 2)]);
    let (b10, b11, b12) = (b[(1, 0)], b[(1, 1)], b[(1, 2)]);

    if nonzero(b02, zero) && nonzero(b12, zero) {
        // v0 = 1
        let det = b01 * b12 - b11 * b02;
        let v1 = if nonzero(det, zero) { (b10 * b02 - b00 * b12) / det } else { one };
        let v2 = -(b00 + b01 * v1) / b02;
        return vec![one, v1, v2];
    }

    if nonzero(b01, zero) && nonzero(b11, zero) {
        // v2 = 1
        let det = b00 * b11 - b10 * b01;
        let v0 = if nonzero(det, zero) { (b12 * b01 - b02 * b11) / det } else { one };
        let v1 = -(b02 + b00 * v0) / b01;
        return vec![v0, v1, one];
    }

    let mut v = vec![one; 3];
    if nonzero(b00, zero) {
        v[0] = -(b01 + b02) / b00;
    }
    v
}

/// Solve the first non-zero row for its largest coefficient, others set to 1
fn pivot_heuristic<T: Scalar>(b: &Matrix<T>, zero: f64) -> Vector<T> {
    let n = b.rows();
    let mut v = vec![T::one(); n];

    let Some(row) = b.as_rows().iter().find(|row| row.iter().any(|&x| nonzero(x, zero))) else {
        return v;
    };

    let mut pivot = 0;
    for (j, x) in row.iter().enumerate() {
        if x.modulus() > row[pivot].modulus() {
            pivot = j;
        }
    }

    let rest = row.iter()
        .enumerate()
        .filter(|&(j, _)| j != pivot)
        .fold(T::zero(), |acc, (_, &x)| acc + x);
    v[pivot] = -rest / row[pivot];
    v
}

/// Gaussian elimination with complete pivoting.
///
/// The first pivot below `relative · max(1, ‖b‖∞)`, or the smallest pivot when
/// none is that small, is taken as zero. Its column is the free variable, set
/// to 1, with later columns set to 0 and earlier ones back-substituted.
fn row_reduce<T: Scalar>(b: &Matrix<T>, relative: f64) -> Option<Vector<T>> {
    let n = b.rows();
    let threshold = relative * matrix_inf_norm(b).max(1.0);
    let mut m = b.clone().into_rows();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut pivots = Vec::with_capacity(n);

    for k in 0..n {
        let (mut pi, mut pj) = (k, k);
        for i in k..n {
            for j in k..n {
                if m[i][j].modulus() > m[pi][pj].modulus() {
                    (pi, pj) = (i, j);
                }
            }
        }
        m.swap(k, pi);
        for row in m.iter_mut() {
            row.swap(k, pj);
        }
        perm.swap(k, pj);

        let pivot = m[k][k];
        pivots.push(pivot.modulus());
        if pivot.modulus() == 0.0 {
            continue;
        }
        for i in k + 1..n {
            let factor = m[i][k] / pivot;
            for j in k..n {
                let delta = factor * m[k][j];
                m[i][j] = m[i][j] - delta;
            }
        }
    }

    let free = pivots.iter().position(|&p| p < threshold).or_else(|| {
        pivots.iter()
            .enumerate()
            .min_by(|x, y| x.1.total_cmp(y.1))
            .map(|(k, _)| k)
    })?;

    // y holds the unknowns in pivot order
    let mut y = vec![T::zero(); n];
    y[free] = T::one();
    for i in (0..free).rev() {
        let sum = (i + 1..n).fold(T::zero(), |acc, j| acc + m[i][j] * y[j]);
        y[i] = -sum / m[i][i];
    }

    let mut v = vec![T::zero(); n];
    for (k, &col) in perm.iter().enumerate() {
        v[col] = y[k];
    }

    let finite = v.iter().all(|x| x.modulus().is_finite());
    (finite && norm(&v) > 0.0).then_some(v)
}

// ============================================================================
// EIGENVECTOR - Null-space eigenvector for a given eigenvalue
// ============================================================================

pub struct EigenvectorFn;

static EIGENVECTOR_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Square matrix"),
    ArgMeta::required("lambda", "Number or {re, im}", "Eigenvalue of the matrix"),
];
static EIGENVECTOR_EXAMPLES: [&str; 2] = [
    "eigenvector([[2, 0], [0, 3]], 3) → {vector: [0, 1]}",
    "eigenvector([[0, -1], [1, 0]], {re: 0, im: 1}) → {vector: [1, -i]}",
];
static EIGENVECTOR_RELATED: [&str; 2] = ["eigenvalues", "eigen"];

impl FunctionPlugin for EigenvectorFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "eigenvector",
            description: "Eigenvector for a known eigenvalue, scaled by the free parameter",
            usage: "eigenvector(matrix, lambda)",
            args: &EIGENVECTOR_ARGS,
            returns: "Object",
            examples: &EIGENVECTOR_EXAMPLES,
            category: "eigen",
            related: &EIGENVECTOR_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl EigenvectorFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "eigenvector", 2, 2)?;
        let a = matrix_arg(args, 0, "eigenvector")?;
        let lambda = extract_eigenvalue(&args[1], "eigenvector", "lambda")?;

        let RecoveredVector { vector, method, residual } = eigenvector(&a, &lambda, &ctx.config)?;
        let t = ctx.config.free_parameter;
        Ok(Value::object([
            ("vector", Value::from(vector.scaled(t))),
            ("method", Value::from(method.as_str())),
            ("exact", Value::Bool(method.is_exact())),
            ("residual", Value::Number(residual * t.abs())),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_core::Complex64;
    use spectra_plugin::PluginRegistry;
    use std::sync::Arc;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn diag(values: &[f64]) -> Matrix {
        Matrix::from_fn(values.len(), values.len(), |i, j| if i == j { values[i] } else { 0.0 })
    }

    fn real(result: &RecoveredVector) -> Vec<f64> {
        result.vector.as_real().unwrap().to_vec()
    }

    /// Parallel to `expected` up to a nonzero factor
    fn assert_parallel(v: &[f64], expected: &[f64]) {
        let (k, _) = expected.iter().enumerate().find(|(_, x)| x.abs() > 0.0).unwrap();
        let t = v[k] / expected[k];
        assert!(t.abs() > 1e-12, "zero vector {:?}", v);
        for (x, e) in v.iter().zip(expected) {
            assert!((x - t * e).abs() < 1e-9, "{:?} is not parallel to {:?}", v, expected);
        }
    }

    #[test]
    fn test_diagonal_2x2() {
        let a = m(&[&[2.0, 0.0], &[0.0, 3.0]]);
        let config = SolverConfig::default();

        let v3 = eigenvector(&a, &Eigenvalue::Real(3.0), &config).unwrap();
        assert_eq!(real(&v3), vec![0.0, 1.0]);
        assert_eq!(v3.method, RecoveryMethod::ClosedForm);

        let v2 = eigenvector(&a, &Eigenvalue::Real(2.0), &config).unwrap();
        assert_eq!(real(&v2), vec![1.0, 0.0]);
        assert_eq!(v2.residual, 0.0);
    }

    #[test]
    fn test_zero_shifted_matrix_gives_basis_vector() {
        let v = eigenvector(&Matrix::identity(2), &Eigenvalue::Real(1.0), &SolverConfig::default()).unwrap();
        assert_eq!(real(&v), vec![0.0, 1.0]);
    }

    #[test]
    fn test_rotation_complex_vector() {
        let a = m(&[&[0.0, -1.0], &[1.0, 0.0]]);
        let lambda = Eigenvalue::Complex(Complex64::new(0.0, 1.0));
        let result = eigenvector(&a, &lambda, &SolverConfig::default()).unwrap();

        match &result.vector {
            Eigenvector::Complex(v) => {
                assert_eq!(v[0], Complex64::new(1.0, 0.0));
                assert!((v[1] - Complex64::new(0.0, -1.0)).norm() < 1e-12);
            }
            other => panic!("expected a complex vector, got {:?}", other),
        }
        assert!(result.residual < 1e-12);
    }

    #[test]
    fn test_triangular_3x3_needs_row_reduction() {
        let a = m(&[&[4.0, 1.0, 0.0], &[0.0, 3.0, 0.0], &[0.0, 0.0, 2.0]]);
        let config = SolverConfig::default();

        for (lambda, expected) in [(4.0, [1.0, 0.0, 0.0]), (3.0, [1.0, -1.0, 0.0]), (2.0, [0.0, 0.0, 1.0])] {
            let result = eigenvector(&a, &Eigenvalue::Real(lambda), &config).unwrap();
            assert_parallel(&real(&result), &expected);
            assert_eq!(result.method, RecoveryMethod::RowReduction);
            assert!(result.residual < 1e-8);
        }
    }

    #[test]
    fn test_symmetric_3x3_closed_form() {
        let a = m(&[&[2.0, 1.0, 0.0], &[1.0, 2.0, 1.0], &[0.0, 1.0, 2.0]]);
        let config = SolverConfig::default();

        let sqrt2 = 2.0_f64.sqrt();
        let result = eigenvector(&a, &Eigenvalue::Real(2.0 + sqrt2), &config).unwrap();
        assert_eq!(result.method, RecoveryMethod::ClosedForm);
        assert_parallel(&real(&result), &[1.0, sqrt2, 1.0]);

        // the all-ones guess misses here
        let result = eigenvector(&a, &Eigenvalue::Real(2.0), &config).unwrap();
        assert_eq!(result.method, RecoveryMethod::RowReduction);
        assert_parallel(&real(&result), &[1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_approximate_double_root() {
        // Newton stops about 1e-6 short of a double root
        let a = diag(&[2.0, 2.0, 5.0]);
        let result = eigenvector(&a, &Eigenvalue::Real(2.0 - 7e-7), &SolverConfig::default()).unwrap();
        let v = real(&result);
        assert!(v[2].abs() < 1e-12);
        assert!(v[0].abs() + v[1].abs() > 0.5);
        assert!(result.residual < 1e-5);
    }

    #[test]
    fn test_pivot_heuristic_accepted_when_consistent() {
        let ones = Matrix::from_fn(4, 4, |_, _| 1.0);
        let result = eigenvector(&ones, &Eigenvalue::Real(4.0), &SolverConfig::default()).unwrap();
        assert_eq!(result.method, RecoveryMethod::PivotHeuristic);
        assert!(!result.method.is_exact());
        assert_parallel(&real(&result), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_diagonal_4x4_falls_back_to_row_reduction() {
        let a = diag(&[1.0, 2.0, 3.0, 4.0]);
        let result = eigenvector(&a, &Eigenvalue::Real(3.0), &SolverConfig::default()).unwrap();
        assert_eq!(result.method, RecoveryMethod::RowReduction);
        assert_parallel(&real(&result), &[0.0, 0.0, 1.0, 0.0]);
        assert!(result.residual < 1e-8);
    }

    #[test]
    fn test_never_returns_zero_vector() {
        let config = SolverConfig::default();
        let matrices = [
            Matrix::zeros(3, 3),
            diag(&[1.0, 1.0, 1.0]),
            m(&[&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[0.0, 0.0, 0.0]]),
            m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]]),
            Matrix::zeros(5, 5),
        ];
        for a in &matrices {
            for lambda in [0.0, 1.0, -2.5] {
                let result = eigenvector(a, &Eigenvalue::Real(lambda), &config).unwrap();
                assert!(!result.vector.is_zero(1e-12), "{:?} for {}", result, lambda);
            }
        }
    }

    #[test]
    fn test_eigenvector_fn_applies_free_parameter() {
        let ctx = EvalContext::new(Arc::new(PluginRegistry::new())).with_free_parameter(-2.0);
        let a = Value::from(m(&[&[2.0, 0.0], &[0.0, 3.0]]));

        let result = EigenvectorFn.call(&[a.clone(), Value::Number(3.0)], &ctx);
        assert_eq!(result.get("vector").as_list().and_then(|v| v[1].as_number()), Some(-2.0));
        assert_eq!(result.get("method").as_text(), Some("closed_form"));
        assert_eq!(result.get("exact").as_bool(), Some(true));

        let lambda = Value::object([("re", Value::Number(0.0)), ("im", Value::Number(1.0))]);
        let result = EigenvectorFn.call(&[Value::from(m(&[&[0.0, -1.0], &[1.0, 0.0]])), lambda], &ctx);
        assert!(result.get("vector").as_list().is_some());

        assert!(EigenvectorFn.call(&[a], &ctx).is_error());
    }
}
