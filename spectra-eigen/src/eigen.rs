//! Full eigen-decomposition: eigenvalues from a chosen solver, then an
//! eigenvector and its residual check for each distinct eigenvalue

use serde::{Deserialize, Serialize};
use spectra_core::{Convergence, Eigenvalue, Eigenvector, LinalgError, Matrix, SolverConfig, SpectraError, Value};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use crate::analytic::{analytic_eigenvalues, AnalyticEigenvalues};
use crate::helpers::{check_arg_count, into_value, matrix_arg};
use crate::nullspace::{eigenvector, RecoveredVector, RecoveryMethod};
use crate::ops::{residual, Residual};
use crate::power::{power_iteration, PowerIteration};
use crate::qr_iteration::{qr_eigenvalues, QrIteration};

/// Which eigenvalue solver feeds the decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Closed form, 2×2 and 3×3 only
    Analytic,
    QrIteration,
    /// Dominant eigenvalue only
    Power,
    /// Analytic for 2×2 and 3×3, QR iteration otherwise
    #[default]
    Auto,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Analytic => "analytic",
            Strategy::QrIteration => "qr_iteration",
            Strategy::Power => "power",
            Strategy::Auto => "auto",
        }
    }

    /// The concrete solver `Auto` stands for at dimension `n`
    pub fn resolve(self, n: usize) -> Strategy {
        match self {
            Strategy::Auto if n == 2 || n == 3 => Strategy::Analytic,
            Strategy::Auto => Strategy::QrIteration,
            other => other,
        }
    }
}

impl FromStr for Strategy {
    type Err = LinalgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analytic" => Ok(Strategy::Analytic),
            "qr" | "qr_iteration" => Ok(Strategy::QrIteration),
            "power" => Ok(Strategy::Power),
            "auto" => Ok(Strategy::Auto),
            other => Err(LinalgError::InvalidConfig(format!(
                "unknown strategy '{}' (expected analytic, qr_iteration, power or auto)", other
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One distinct eigenvalue with its eigenvector and the `A·v = λ·v` check
#[derive(Debug, Clone, PartialEq)]
pub struct EigenPair {
    pub eigenvalue: Eigenvalue,
    /// How many reported eigenvalues fell within the dedup radius of this one
    pub multiplicity: usize,
    /// Scaled by the configured free parameter
    pub eigenvector: Eigenvector,
    pub av: Eigenvector,
    pub lambda_v: Eigenvector,
    pub residual: f64,
    pub method: RecoveryMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    /// The solver actually used (never `Auto`)
    pub strategy: Strategy,
    pub pairs: Vec<EigenPair>,
    pub convergence: Convergence,
}

impl EigenDecomposition {
    pub fn eigenvalues(&self) -> Vec<Eigenvalue> {
        self.pairs.iter().map(|p| p.eigenvalue).collect()
    }

    /// Largest `‖A·v − λ·v‖` over all pairs
    pub fn max_residual(&self) -> f64 {
        self.pairs.iter().map(|p| p.residual).fold(0.0, f64::max)
    }
}

pub fn decompose(a: &Matrix, strategy: Strategy, config: &SolverConfig) -> Result<EigenDecomposition, LinalgError> {
    let n = a.require_square("eigen")?;
    let strategy = strategy.resolve(n);

    let (eigenvalues, convergence) = match strategy {
        Strategy::Analytic => {
            let AnalyticEigenvalues { eigenvalues, convergence } = analytic_eigenvalues(a, config)?;
            (eigenvalues, convergence)
        }
        Strategy::QrIteration => {
            let QrIteration { eigenvalues, convergence, .. } = qr_eigenvalues(a, config)?;
            (eigenvalues.into_iter().map(Eigenvalue::Real).collect(), convergence)
        }
        Strategy::Power | Strategy::Auto => {
            let PowerIteration { eigenvalue, iterations, .. } = power_iteration(a, config)?;
            (vec![Eigenvalue::Real(eigenvalue)], Convergence::Converged { iterations })
        }
    };

    let groups = group_eigenvalues(&eigenvalues, config.root_dedup_radius);
    debug!(%strategy, found = eigenvalues.len(), distinct = groups.len(), "eigenvalues grouped");

    let pairs = groups
        .into_iter()
        .map(|(lambda, multiplicity)| eigen_pair(a, lambda, multiplicity, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EigenDecomposition { strategy, pairs, convergence })
}

/// Merge eigenvalues within `radius` of an earlier one, keeping first-seen order
fn group_eigenvalues(values: &[Eigenvalue], radius: f64) -> Vec<(Eigenvalue, usize)> {
    let mut groups: Vec<(Eigenvalue, usize)> = Vec::new();
    for lambda in values {
        match groups.iter_mut().find(|(g, _)| g.approx_eq(lambda, radius)) {
            Some((_, count)) => *count += 1,
            None => groups.push((*lambda, 1)),
        }
    }
    groups
}

fn eigen_pair(a: &Matrix, lambda: Eigenvalue, multiplicity: usize, config: &SolverConfig) -> Result<EigenPair, LinalgError> {
    let RecoveredVector { vector, method, .. } = eigenvector(a, &lambda, config)?;
    let vector = vector.scaled(config.free_parameter);

    let (av, lambda_v, residual) = match (&vector, lambda) {
        (Eigenvector::Real(v), Eigenvalue::Real(x)) => {
            let Residual { av, lambda_v, norm } = residual(a, x, v)?;
            (Eigenvector::Real(av), Eigenvector::Real(lambda_v), norm)
        }
        _ => {
            let v = vector.to_complex();
            let Residual { av, lambda_v, norm } = residual(&a.to_complex(), lambda.to_complex(), &v)?;
            (Eigenvector::Complex(av), Eigenvector::Complex(lambda_v), norm)
        }
    };

    Ok(EigenPair { eigenvalue: lambda, multiplicity, eigenvector: vector, av, lambda_v, residual, method })
}

// ============================================================================
// EIGEN - Full decomposition
// ============================================================================

pub struct EigenFn;

static EIGEN_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Square matrix"),
    ArgMeta::optional("strategy", "Text", "analytic, qr_iteration, power or auto", "auto"),
];
static EIGEN_EXAMPLES: [&str; 2] = [
    "eigen([[2, 0], [0, 3]]) → {pairs: [{eigenvalue: 3, vector: [0, 1]}, {eigenvalue: 2, vector: [1, 0]}]}",
    "eigen(m, \"qr_iteration\")",
];
static EIGEN_RELATED: [&str; 3] = ["eigenvalues", "eigenvector", "qr_eigenvalues"];

impl FunctionPlugin for EigenFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "eigen",
            description: "Eigenvalues, eigenvectors and A·v = λ·v checks",
            usage: "eigen(matrix, [strategy])",
            args: &EIGEN_ARGS,
            returns: "Object",
            examples: &EIGEN_EXAMPLES,
            category: "eigen",
            related: &EIGEN_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl EigenFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "eigen", 1, 2)?;
        let a = matrix_arg(args, 0, "eigen")?;
        let strategy = match args.get(1) {
            None => Strategy::Auto,
            Some(Value::Text(s)) => s.parse().map_err(|e| SpectraError::from(e).in_function("eigen"))?,
            Some(other) => return Err(SpectraError::arg_type("eigen", "strategy", "Text", other.type_name())),
        };

        let decomposition = decompose(&a, strategy, &ctx.config)
            .map_err(|e| SpectraError::from(e).in_function("eigen"))?;

        let pairs = decomposition.pairs.iter()
            .map(|p| Value::object([
                ("eigenvalue", Value::from(p.eigenvalue)),
                ("multiplicity", Value::from(p.multiplicity)),
                ("vector", Value::from(p.eigenvector.clone())),
                ("Av", Value::from(p.av.clone())),
                ("lambda_v", Value::from(p.lambda_v.clone())),
                ("residual", Value::Number(p.residual)),
                ("method", Value::from(p.method.as_str())),
                ("exact", Value::Bool(p.method.is_exact())),
            ]))
            .collect();
        let eigenvalues = decomposition.eigenvalues().into_iter().map(Value::from).collect();

        Ok(crate::with_convergence(
            vec![
                ("strategy", Value::from(decomposition.strategy.as_str())),
                ("eigenvalues", Value::List(eigenvalues)),
                ("pairs", Value::List(pairs)),
            ],
            "eigen",
            decomposition.convergence,
        ))
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

    #[test]
    fn test_diagonal_2x2_pairs() {
        let d = decompose(&m(&[&[2.0, 0.0], &[0.0, 3.0]]), Strategy::Auto, &SolverConfig::default()).unwrap();
        assert_eq!(d.strategy, Strategy::Analytic);
        assert_eq!(d.eigenvalues(), vec![Eigenvalue::Real(3.0), Eigenvalue::Real(2.0)]);
        assert_eq!(d.pairs[0].eigenvector, Eigenvector::Real(vec![0.0, 1.0]));
        assert_eq!(d.pairs[1].eigenvector, Eigenvector::Real(vec![1.0, 0.0]));
        assert_eq!(d.pairs[0].av, d.pairs[0].lambda_v);
        assert_eq!(d.max_residual(), 0.0);
    }

    #[test]
    fn test_rotation_complex_pairs() {
        let d = decompose(&m(&[&[0.0, -1.0], &[1.0, 0.0]]), Strategy::Auto, &SolverConfig::default()).unwrap();
        assert_eq!(d.pairs.len(), 2);
        assert_eq!(d.pairs[0].eigenvalue, Eigenvalue::Complex(Complex64::new(0.0, 1.0)));
        assert!(matches!(d.pairs[1].eigenvector, Eigenvector::Complex(_)));
        assert!(d.max_residual() < 1e-12);
    }

    #[test]
    fn test_triangular_3x3() {
        let a = m(&[&[4.0, 1.0, 0.0], &[0.0, 3.0, 0.0], &[0.0, 0.0, 2.0]]);
        let d = decompose(&a, Strategy::Analytic, &SolverConfig::default()).unwrap();
        assert_eq!(d.pairs.len(), 3);
        for pair in &d.pairs {
            assert!(pair.residual < 1e-8, "λ = {} residual {}", pair.eigenvalue, pair.residual);
            assert!(!pair.eigenvector.is_zero(1e-12));
        }
    }

    #[test]
    fn test_repeated_eigenvalue_grouped() {
        let d = decompose(&Matrix::identity(2), Strategy::Auto, &SolverConfig::default()).unwrap();
        assert_eq!(d.pairs.len(), 1);
        assert_eq!(d.pairs[0].multiplicity, 2);
        assert_eq!(d.pairs[0].eigenvalue, Eigenvalue::Real(1.0));
    }

    #[test]
    fn test_double_root_3x3() {
        // characteristic polynomial (λ - 2)²(λ - 5)
        let a = m(&[&[2.0, 0.0, 0.0], &[0.0, 2.0, 0.0], &[0.0, 0.0, 5.0]]);
        let d = decompose(&a, Strategy::Auto, &SolverConfig::default()).unwrap();
        assert_eq!(d.pairs.len(), 2);
        assert!((d.pairs[0].eigenvalue.re() - 5.0).abs() < 1e-9);
        assert!((d.pairs[1].eigenvalue.re() - 2.0).abs() < 1e-4);
        assert!(d.max_residual() < 1e-4);
    }

    #[test]
    fn test_qr_strategy_on_4x4() {
        let a = m(&[
            &[5.0, 1.0, 0.0, 0.5],
            &[1.0, 4.0, 1.0, 0.0],
            &[0.0, 1.0, 3.0, 1.0],
            &[0.5, 0.0, 1.0, 1.0],
        ]);
        let d = decompose(&a, Strategy::Auto, &SolverConfig::default()).unwrap();
        assert_eq!(d.strategy, Strategy::QrIteration);
        assert!(d.convergence.is_converged());
        assert_eq!(d.pairs.len(), 4);
        assert!(d.max_residual() < 1e-6, "residual {}", d.max_residual());
    }

    #[test]
    fn test_power_strategy_single_pair() {
        let d = decompose(&m(&[&[2.0, 1.0], &[1.0, 2.0]]), Strategy::Power, &SolverConfig::default()).unwrap();
        assert_eq!(d.pairs.len(), 1);
        assert!((d.pairs[0].eigenvalue.re() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_free_parameter_selects_family_member() {
        let config = SolverConfig::default().with_free_parameter(2.5);
        let d = decompose(&m(&[&[2.0, 0.0], &[0.0, 3.0]]), Strategy::Auto, &config).unwrap();
        assert_eq!(d.pairs[0].eigenvector, Eigenvector::Real(vec![0.0, 2.5]));
        assert_eq!(d.pairs[0].av, Eigenvector::Real(vec![0.0, 7.5]));
    }

    #[test]
    fn test_analytic_strategy_rejects_4x4() {
        let err = decompose(&Matrix::identity(4), Strategy::Analytic, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, LinalgError::UnsupportedDimension { n: 4, .. }));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("QR".parse::<Strategy>().unwrap(), Strategy::QrIteration);
        assert_eq!("auto".parse::<Strategy>().unwrap(), Strategy::Auto);
        assert!("jacobi".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Auto.resolve(5), Strategy::QrIteration);
    }

    #[test]
    fn test_eigen_fn() {
        let ctx = EvalContext::new(Arc::new(PluginRegistry::new()));
        let a = Value::from(m(&[&[2.0, 0.0], &[0.0, 3.0]]));

        let result = EigenFn.call(&[a.clone()], &ctx);
        assert_eq!(result.get("strategy").as_text(), Some("analytic"));
        let pairs = result.get("pairs");
        let first = &pairs.as_list().unwrap()[0];
        assert_eq!(first.get("eigenvalue").as_number(), Some(3.0));
        assert_eq!(first.get("Av").as_list().map(|v| v.len()), Some(2));

        let err = EigenFn.call(&[a.clone(), Value::from("jacobi")], &ctx);
        assert_eq!(err.as_error().map(|e| e.code.as_str()), Some(codes::INVALID_CONFIG));

        let err = EigenFn.call(&[a, Value::Number(1.0)], &ctx);
        assert_eq!(err.as_error().map(|e| e.code.as_str()), Some(codes::ARG_TYPE));
    }
}
