//! Spectra Eigen - Eigenvalue and Eigenvector Solvers
//!
//! Provides eigen-decomposition for small dense real matrices:
//! - Matrix primitives (matmul, matvec, norm) and QR decomposition
//! - Closed-form eigenvalues for 2×2 and 3×3 (complex pairs included)
//! - Unshifted QR iteration for any size, power iteration for the dominant pair
//! - Null-space eigenvector recovery with a residual check
//! - A driver tying a solver to eigenvectors and `A·v = λ·v` checks
//!
//! Iterative solvers never fail on exhausting their budget; they return their
//! best approximation with a `Convergence::Exhausted` status.

mod helpers;
pub mod ops;
pub mod decompose;
pub mod roots;
pub mod analytic;
pub mod qr_iteration;
pub mod power;
pub mod nullspace;
pub mod eigen;

pub use analytic::{analytic_eigenvalues, analytic_real_eigenvalues, eigenvalues_2x2, eigenvalues_3x3, AnalyticEigenvalues};
pub use decompose::{qr_decompose, QrDecomposition};
pub use eigen::{decompose, EigenDecomposition, EigenPair, Strategy};
pub use helpers::extract_matrix;
pub use nullspace::{eigenvector, RecoveredVector, RecoveryMethod};
pub use ops::{apply, multiply, norm, residual, Residual};
pub use power::{power_iteration, PowerIteration};
pub use qr_iteration::{qr_eigenvalues, QrIteration};
pub use roots::{solve_cubic, Cubic, RootSet};

use spectra_core::{Convergence, SpectraError, Value};
use spectra_plugin::PluginRegistry;

/// Load eigen functions into registry
pub fn load_eigen_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Primitives (4 functions)
        .with_function(ops::MatmulFn)
        .with_function(ops::MatvecFn)
        .with_function(ops::NormFn)
        .with_function(decompose::QrFn)

        // Eigenvalues (5 functions)
        .with_function(roots::CubicRootsFn)
        .with_function(analytic::EigenvaluesFn)
        .with_function(analytic::EigenvaluesRealFn)
        .with_function(qr_iteration::QrEigenvaluesFn)
        .with_function(power::PowerIterationFn)

        // Eigenvectors (2 functions)
        .with_function(nullspace::EigenvectorFn)
        .with_function(eigen::EigenFn)
}

/// Build a result object with `converged`, `iterations` and, when the solver
/// ran out of budget, a `warning` holding a non-convergence error
pub(crate) fn with_convergence(
    mut fields: Vec<(&'static str, Value)>,
    solver: &str,
    convergence: Convergence,
) -> Value {
    fields.push(("converged", Value::Bool(convergence.is_converged())));
    fields.push(("iterations", Value::from(convergence.iterations())));
    if let Convergence::Exhausted { iterations, residual } = convergence {
        fields.push(("warning", Value::Error(SpectraError::non_convergence(solver, iterations, residual))));
    }
    Value::object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_plugin::EvalContext;
    use std::sync::Arc;

    #[test]
    fn test_load_eigen_library() {
        let registry = load_eigen_library(PluginRegistry::new());

        assert_eq!(registry.len(), 11);
        for name in ["matmul", "matvec", "norm", "qr", "cubic_roots", "eigenvalues",
                     "eigenvalues_real", "qr_eigenvalues", "power_iteration", "eigenvector", "eigen"] {
            assert!(registry.get_function(name).is_some(), "{} not registered", name);
        }
    }

    #[test]
    fn test_call_through_context() {
        let ctx = EvalContext::new(Arc::new(load_eigen_library(PluginRegistry::new())));
        let m = Value::List(vec![Value::from(vec![2.0, 0.0]), Value::from(vec![0.0, 3.0])]);

        let result = ctx.call("eigen", &[m.clone()]);
        assert_eq!(result.get("converged").as_bool(), Some(true));
        assert_eq!(result.get("eigenvalues").as_list().map(|l| l.len()), Some(2));

        let result = ctx.call("EIGENVALUES", &[m]);
        assert!(!result.is_error());
    }

    #[test]
    fn test_with_convergence_warning() {
        let value = with_convergence(vec![], "qr_eigenvalues", Convergence::Exhausted { iterations: 7, residual: 0.5 });
        assert_eq!(value.get("iterations").as_number(), Some(7.0));
        assert!(value.get("warning").as_error().is_some_and(|e| e.is_warning()));

        let value = with_convergence(vec![], "eigenvalues", Convergence::Converged { iterations: 0 });
        assert!(value.as_object().is_some_and(|fields| !fields.contains_key("warning")));
    }
}
