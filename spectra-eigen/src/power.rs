//! Power iteration for the dominant eigenpair

use spectra_core::{LinalgError, Matrix, SolverConfig, SpectraError, Value, Vector};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use tracing::debug;
use crate::helpers::{check_arg_count, extract_number, into_value, matrix_arg};
use crate::ops::{apply, dot};

#[derive(Debug, Clone, PartialEq)]
pub struct PowerIteration {
    /// Rayleigh quotient of the final vector
    pub eigenvalue: f64,
    /// Scaled so its largest-magnitude component is 1
    pub eigenvector: Vector,
    pub iterations: usize,
}

/// Run exactly `config.power_iterations` steps from the all-ones vector.
///
/// Each step rescales by the signed largest-magnitude component; a step whose
/// largest component is below `zero_threshold` is left unscaled. There is no
/// convergence test. Accuracy depends on the gap between the two largest
/// eigenvalue magnitudes.
pub fn power_iteration(a: &Matrix, config: &SolverConfig) -> Result<PowerIteration, LinalgError> {
    let n = a.require_square("power_iteration")?;
    let mut v = vec![1.0; n];

    for _ in 0..config.power_iterations {
        v = apply(a, &v)?;
        let largest = v.iter().copied().fold(0.0_f64, |m, x| if x.abs() > m.abs() { x } else { m });
        if largest.abs() >= config.zero_threshold {
            v.iter_mut().for_each(|x| *x /= largest);
        }
    }

    let av = apply(a, &v)?;
    let vv = dot(&v, &v)?;
    let eigenvalue = if vv == 0.0 { 0.0 } else { dot(&v, &av)? / vv };
    debug!(eigenvalue, iterations = config.power_iterations, "power iteration finished");

    Ok(PowerIteration {
        eigenvalue,
        eigenvector: v,
        iterations: config.power_iterations,
    })
}

// ============================================================================
// POWER_ITERATION - Dominant eigenpair
// ============================================================================

pub struct PowerIterationFn;

static POWER_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("matrix", "Matrix", "Square matrix"),
    ArgMeta::optional("iterations", "Number", "Number of steps", "100"),
];
static POWER_EXAMPLES: [&str; 1] = ["power_iteration([[2, 1], [1, 2]]) → {eigenvalue: 3, eigenvector: [1, 1]}"];
static POWER_RELATED: [&str; 1] = ["qr_eigenvalues"];

impl FunctionPlugin for PowerIterationFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "power_iteration",
            description: "Dominant eigenvalue and eigenvector by power iteration",
            usage: "power_iteration(matrix, [iterations])",
            args: &POWER_ARGS,
            returns: "Object",
            examples: &POWER_EXAMPLES,
            category: "eigen",
            related: &POWER_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl PowerIterationFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "power_iteration", 1, 2)?;
        let a = matrix_arg(args, 0, "power_iteration")?;

        let mut config = ctx.config.clone();
        if let Some(arg) = args.get(1) {
            let steps = extract_number(arg, "power_iteration", "iterations")?;
            if steps < 1.0 || steps.fract() != 0.0 {
                return Err(SpectraError::domain_error(format!(
                    "power_iteration: iterations must be a positive integer, got {}", steps
                )));
            }
            config.power_iterations = steps as usize;
        }

        let PowerIteration { eigenvalue, eigenvector, iterations } = power_iteration(&a, &config)?;
        Ok(Value::object([
            ("eigenvalue", Value::Number(eigenvalue)),
            ("eigenvector", Value::from(eigenvector)),
            ("iterations", Value::from(iterations)),
        ]))
    }
}
