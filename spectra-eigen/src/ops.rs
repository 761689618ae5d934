//! Matrix arithmetic primitives
//!
//! Pure functions over real or complex entries. Shapes are checked and a
//! mismatch is always reported as `DimensionMismatch`.

use spectra_core::{LinalgError, Matrix, Scalar, SpectraError, Value, Vector};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use crate::helpers::{check_arg_count, extract_matrix, extract_vector, into_value};

/// Matrix product `a · b`
pub fn multiply<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
    if a.cols() != b.rows() {
        return Err(LinalgError::DimensionMismatch {
            op: "multiply",
            left: a.shape(),
            right: b.shape(),
        });
    }

    Ok(Matrix::from_fn(a.rows(), b.cols(), |i, j| {
        (0..a.cols()).fold(T::zero(), |acc, k| acc + a[(i, k)] * b[(k, j)])
    }))
}

/// Matrix-vector product `a · v`
pub fn apply<T: Scalar>(a: &Matrix<T>, v: &[T]) -> Result<Vector<T>, LinalgError> {
    if a.cols() != v.len() {
        return Err(LinalgError::DimensionMismatch {
            op: "apply",
            left: a.shape(),
            right: format!("vector of length {}", v.len()),
        });
    }

    Ok(a.as_rows()
        .iter()
        .map(|row| row.iter().zip(v).fold(T::zero(), |acc, (&x, &y)| acc + x * y))
        .collect())
}

/// Euclidean norm
pub fn norm<T: Scalar>(v: &[T]) -> f64 {
    v.iter().map(|x| x.modulus().powi(2)).sum::<f64>().sqrt()
}

/// Largest component modulus
pub fn inf_norm<T: Scalar>(v: &[T]) -> f64 {
    v.iter().map(|x| x.modulus()).fold(0.0, f64::max)
}

/// Bilinear dot product `Σ uᵢvᵢ` (no conjugation)
pub fn dot<T: Scalar>(u: &[T], v: &[T]) -> Result<T, LinalgError> {
    if u.len() != v.len() {
        return Err(LinalgError::DimensionMismatch {
            op: "dot",
            left: format!("vector of length {}", u.len()),
            right: format!("vector of length {}", v.len()),
        });
    }
    Ok(u.iter().zip(v).fold(T::zero(), |acc, (&x, &y)| acc + x * y))
}

/// Multiply every component by `s`
pub fn scale<T: Scalar>(v: &[T], s: T) -> Vector<T> {
    v.iter().map(|&x| x * s).collect()
}

pub fn transpose<T: Scalar>(a: &Matrix<T>) -> Matrix<T> {
    Matrix::from_fn(a.cols(), a.rows(), |i, j| a[(j, i)])
}

/// `a − λI`
pub fn shifted<T: Scalar>(a: &Matrix<T>, lambda: T) -> Result<Matrix<T>, LinalgError> {
    a.require_square("shifted")?;
    let mut m = a.clone();
    for i in 0..m.rows() {
        m[(i, i)] = m[(i, i)] - lambda;
    }
    Ok(m)
}

/// Sum of the diagonal
pub fn trace<T: Scalar>(a: &Matrix<T>) -> T {
    a.diagonal().into_iter().fold(T::zero(), |acc, x| acc + x)
}

/// Largest off-diagonal modulus (the "off-diagonal mass")
pub fn max_off_diagonal<T: Scalar>(a: &Matrix<T>) -> f64 {
    let mut max = 0.0_f64;
    for i in 0..a.rows() {
        for j in 0..a.cols() {
            if i != j {
                max = max.max(a[(i, j)].modulus());
            }
        }
    }
    max
}

/// Maximum absolute row sum
pub fn matrix_inf_norm<T: Scalar>(a: &Matrix<T>) -> f64 {
    a.as_rows()
        .iter()
        .map(|row| row.iter().map(|x| x.modulus()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// The two sides of `A·v = λ·v` and the norm of their difference
#[derive(Debug, Clone, PartialEq)]
pub struct Residual<T = f64> {
    pub av: Vector<T>,
    pub lambda_v: Vector<T>,
    pub norm: f64,
}

pub fn residual<T: Scalar>(a: &Matrix<T>, lambda: T, v: &[T]) -> Result<Residual<T>, LinalgError> {
    let av = apply(a, v)?;
    let lambda_v = scale(v, lambda);
    let diff: Vector<T> = av.iter().zip(&lambda_v).map(|(&x, &y)| x - y).collect();
    Ok(Residual { norm: norm(&diff), av, lambda_v })
}

// ============================================================================
// MATMUL - Matrix product
// ============================================================================

pub struct MatmulFn;

static MATMUL_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("a", "Matrix", "Left operand"),
    ArgMeta::required("b", "Matrix", "Right operand"),
];
static MATMUL_EXAMPLES: [&str; 1] = ["matmul([[1, 2], [3, 4]], [[0, 1], [1, 0]]) → [[2, 1], [4, 3]]"];
static MATMUL_RELATED: [&str; 1] = ["matvec"];

impl FunctionPlugin for MatmulFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matmul",
            description: "Matrix product A·B",
            usage: "matmul(a, b)",
            args: &MATMUL_ARGS,
            returns: "Matrix",
            examples: &MATMUL_EXAMPLES,
            category: "arithmetic",
            related: &MATMUL_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        into_value(self.run(args))
    }
}

impl MatmulFn {
    fn run(&self, args: &[Value]) -> Result<Value, SpectraError> {
        check_arg_count(args, "matmul", 2, 2)?;
        let a = extract_matrix(&args[0], "matmul", "a")?;
        let b = extract_matrix(&args[1], "matmul", "b")?;
        Ok(multiply(&a, &b)?.into())
    }
}

// ============================================================================
// MATVEC - Matrix-vector product
// ============================================================================

pub struct MatvecFn;

static MATVEC_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Matrix A"),
    ArgMeta::required("vector", "List", "Vector v"),
];
static MATVEC_EXAMPLES: [&str; 1] = ["matvec([[2, 0], [0, 3]], [1, 1]) → [2, 3]"];
static MATVEC_RELATED: [&str; 2] = ["matmul", "norm"];

impl FunctionPlugin for MatvecFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "matvec",
            description: "Matrix-vector product A·v",
            usage: "matvec(matrix, vector)",
            args: &MATVEC_ARGS,
            returns: "List",
            examples: &MATVEC_EXAMPLES,
            category: "arithmetic",
            related: &MATVEC_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        into_value(self.run(args))
    }
}

impl MatvecFn {
    fn run(&self, args: &[Value]) -> Result<Value, SpectraError> {
        check_arg_count(args, "matvec", 2, 2)?;
        let a = extract_matrix(&args[0], "matvec", "matrix")?;
        let v = extract_vector(&args[1], "matvec", "vector")?;
        Ok(apply(&a, &v)?.into())
    }
}

// ============================================================================
// NORM - Euclidean vector norm
// ============================================================================

pub struct NormFn;

static NORM_ARGS: [ArgMeta; 1] = [ArgMeta::required("vector", "List", "Vector")];
static NORM_EXAMPLES: [&str; 1] = ["norm([3, 4]) → 5"];
static NORM_RELATED: [&str; 1] = ["matvec"];

impl FunctionPlugin for NormFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "norm",
            description: "Euclidean norm of a vector",
            usage: "norm(vector)",
            args: &NORM_ARGS,
            returns: "Number",
            examples: &NORM_EXAMPLES,
            category: "arithmetic",
            related: &NORM_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        into_value(self.run(args))
    }
}

impl NormFn {
    fn run(&self, args: &[Value]) -> Result<Value, SpectraError> {
        check_arg_count(args, "norm", 1, 1)?;
        let v = extract_vector(&args[0], "norm", "vector")?;
        Ok(Value::Number(norm(&v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_core::{codes, Complex64};
    use spectra_plugin::PluginRegistry;
    use std::sync::Arc;

    fn m(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    fn ctx() -> EvalContext {
        EvalContext::new(Arc::new(PluginRegistry::new()))
    }

    #[test]
    fn test_multiply() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[0.0, 1.0], &[1.0, 0.0]]);
        assert_eq!(multiply(&a, &b).unwrap(), m(&[&[2.0, 1.0], &[4.0, 3.0]]));
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]]);
        assert!(matches!(multiply(&a, &b), Err(LinalgError::DimensionMismatch { op: "multiply", .. })));
    }

    #[test]
    fn test_apply() {
        let a = m(&[&[2.0, 0.0], &[0.0, 3.0]]);
        assert_eq!(apply(&a, &[1.0, 1.0]).unwrap(), vec![2.0, 3.0]);
        assert!(matches!(apply(&a, &[1.0]), Err(LinalgError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_apply_complex() {
        let a = m(&[&[0.0, -1.0], &[1.0, 0.0]]).to_complex();
        let i = Complex64::new(0.0, 1.0);
        let v = vec![Complex64::new(1.0, 0.0), -i];
        let av = apply(&a, &v).unwrap();
        assert_eq!(av, scale(&v, i));
    }

    #[test]
    fn test_norms() {
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
        assert_eq!(inf_norm(&[1.0, -7.0, 2.0]), 7.0);
        assert_eq!(matrix_inf_norm(&m(&[&[1.0, -2.0], &[0.5, 0.5]])), 3.0);
    }

    #[test]
    fn test_shift_and_off_diagonal() {
        let a = m(&[&[4.0, 1.0], &[-3.0, 2.0]]);
        let s = shifted(&a, 2.0).unwrap();
        assert_eq!(s, m(&[&[2.0, 1.0], &[-3.0, 0.0]]));
        assert_eq!(max_off_diagonal(&a), 3.0);
        assert_eq!(trace(&a), 6.0);
        assert_eq!(transpose(&a), m(&[&[4.0, -3.0], &[1.0, 2.0]]));
    }

    #[test]
    fn test_residual() {
        let a = m(&[&[2.0, 0.0], &[0.0, 3.0]]);
        let r = residual(&a, 3.0, &[0.0, 1.0]).unwrap();
        assert_eq!(r.av, vec![0.0, 3.0]);
        assert_eq!(r.lambda_v, vec![0.0, 3.0]);
        assert_eq!(r.norm, 0.0);
    }

    #[test]
    fn test_dot_mismatch() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), 11.0);
        assert!(dot(&[1.0], &[3.0, 4.0]).is_err());
    }

    #[test]
    fn test_matmul_fn() {
        let a = Value::from(m(&[&[1.0, 2.0], &[3.0, 4.0]]));
        let b = Value::from(m(&[&[1.0, 0.0], &[0.0, 1.0]]));
        let result = MatmulFn.call(&[a, b], &ctx());
        let rows = result.as_list().unwrap();
        assert_eq!(rows[1].as_list().unwrap()[1].as_number(), Some(4.0));
    }

    #[test]
    fn test_matvec_fn_mismatch() {
        let a = Value::from(m(&[&[1.0, 2.0], &[3.0, 4.0]]));
        let result = MatvecFn.call(&[a, Value::from(vec![1.0, 2.0, 3.0])], &ctx());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::DIMENSION_MISMATCH));
    }

    #[test]
    fn test_norm_fn_arg_count() {
        let result = NormFn.call(&[], &ctx());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::ARG_COUNT));
        let result = NormFn.call(&[Value::from(vec![3.0, 4.0])], &ctx());
        assert_eq!(result.as_number(), Some(5.0));
    }
}
