//! QR decomposition by modified Gram-Schmidt

use spectra_core::{LinalgError, Matrix, SpectraError, Value};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use tracing::debug;
use crate::helpers::{check_arg_count, into_value, matrix_arg};
use crate::ops::{dot, norm, scale};

/// `A = Q·R` with Q orthogonal and R upper triangular
#[derive(Debug, Clone, PartialEq)]
pub struct QrDecomposition {
    pub q: Matrix,
    pub r: Matrix,
}

/// Factor a square matrix column by column.
///
/// Column `j` has its projections onto the already orthogonalized columns
/// `0..j` removed (the coefficients land in `R`) and is then normalized. When
/// the remaining norm is below `zero_threshold` the column of `Q` becomes the
/// basis vector `e_j`; `Q` is then not strictly orthogonal.
pub fn qr_decompose(a: &Matrix, zero_threshold: f64) -> Result<QrDecomposition, LinalgError> {
    let n = a.require_square("qr")?;
    let mut q = Matrix::zeros(n, n);
    let mut r = Matrix::zeros(n, n);

    for j in 0..n {
        let mut v = a.column(j);

        for i in 0..j {
            let qi = q.column(i);
            let proj = dot(&qi, &v)?;
            r[(i, j)] = proj;
            for (vk, qk) in v.iter_mut().zip(&qi) {
                *vk -= proj * qk;
            }
        }

        let len = norm(&v);
        r[(j, j)] = len;

        if len < zero_threshold {
            debug!(column = j, residual = len, "dependent column, using basis vector");
            let e: Vec<f64> = (0..n).map(|k| if k == j { 1.0 } else { 0.0 }).collect();
            q.set_column(j, &e);
        } else {
            q.set_column(j, &scale(&v, 1.0 / len));
        }
    }

    Ok(QrDecomposition { q, r })
}

// ============================================================================
// QR - QR decomposition
// ============================================================================

pub struct QrFn;

static QR_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Square matrix to decompose")];
static QR_EXAMPLES: [&str; 1] = ["qr([[1, 2], [3, 4]]) → {Q, R}"];
static QR_RELATED: [&str; 1] = ["qr_eigenvalues"];

impl FunctionPlugin for QrFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "qr",
            description: "QR decomposition by Gram-Schmidt (returns {Q, R})",
            usage: "qr(matrix)",
            args: &QR_ARGS,
            returns: "Object",
            examples: &QR_EXAMPLES,
            category: "decomposition",
            related: &QR_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl QrFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "qr", 1, 1)?;
        let a = matrix_arg(args, 0, "qr")?;
        let QrDecomposition { q, r } = qr_decompose(&a, ctx.config.zero_threshold)?;

        Ok(Value::object([
            ("Q", Value::from(q)),
            ("R", Value::from(r)),
        ]))
    }
}
