//! Unshifted QR iteration for eigenvalues of any square size
//!
//! Repeats `A ← R·Q` until the off-diagonal part vanishes. There is no shift
//! and no Hessenberg reduction, so a complex-conjugate pair leaves a 2×2 block
//! on the diagonal that never decays; the diagonal is then reported after the
//! iteration cap with an `Exhausted` status.

use spectra_core::{Convergence, LinalgError, Matrix, SolverConfig, SpectraError, Value};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use tracing::{debug, warn};
use crate::decompose::{qr_decompose, QrDecomposition};
use crate::helpers::{check_arg_count, into_value, matrix_arg};
use crate::ops::{max_off_diagonal, multiply};

#[derive(Debug, Clone, PartialEq)]
pub struct QrIteration {
    /// Diagonal of the final iterate, in no particular order
    pub eigenvalues: Vec<f64>,
    pub convergence: Convergence,
    pub final_matrix: Matrix,
}

pub fn qr_eigenvalues(a: &Matrix, config: &SolverConfig) -> Result<QrIteration, LinalgError> {
    a.require_square("qr_eigenvalues")?;
    let mut current = a.clone();
    let mut off_diagonal = max_off_diagonal(&current);

    let mut iterations = 0;
    while off_diagonal >= config.tolerance && iterations < config.max_iterations {
        let QrDecomposition { q, r } = qr_decompose(&current, config.zero_threshold)?;
        current = multiply(&r, &q)?;
        off_diagonal = max_off_diagonal(&current);
        iterations += 1;
    }

    let convergence = if off_diagonal < config.tolerance {
        debug!(iterations, "qr iteration converged");
        Convergence::Converged { iterations }
    } else {
        warn!(iterations, residual = off_diagonal, "qr iteration hit its cap, eigenvalues are approximate");
        Convergence::Exhausted { iterations, residual: off_diagonal }
    };

    Ok(QrIteration {
        eigenvalues: current.diagonal(),
        convergence,
        final_matrix: current,
    })
}

// ============================================================================
// QR_EIGENVALUES - Eigenvalues by QR iteration
// ============================================================================

pub struct QrEigenvaluesFn;

static QR_EIGENVALUES_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Square matrix of any size")];
static QR_EIGENVALUES_EXAMPLES: [&str; 1] = ["qr_eigenvalues([[2, 1], [1, 2]]) → {eigenvalues: [3, 1]}"];
static QR_EIGENVALUES_RELATED: [&str; 2] = ["qr", "eigenvalues"];

impl FunctionPlugin for QrEigenvaluesFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "qr_eigenvalues",
            description: "Approximate real eigenvalues by unshifted QR iteration",
            usage: "qr_eigenvalues(matrix)",
            args: &QR_EIGENVALUES_ARGS,
            returns: "Object",
            examples: &QR_EIGENVALUES_EXAMPLES,
            category: "eigen",
            related: &QR_EIGENVALUES_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl QrEigenvaluesFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "qr_eigenvalues", 1, 1)?;
        let a = matrix_arg(args, 0, "qr_eigenvalues")?;
        let QrIteration { eigenvalues, convergence, final_matrix } = qr_eigenvalues(&a, &ctx.config)?;

        Ok(crate::with_convergence(
            vec![
                ("eigenvalues", Value::from(eigenvalues)),
                ("final_matrix", Value::from(final_matrix)),
            ],
            "qr_eigenvalues",
            convergence,
        ))
    }
}
