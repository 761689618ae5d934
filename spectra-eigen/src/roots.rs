//! Real roots of cubic (and degenerate quadratic) polynomials
//!
//! Newton iteration from a fixed set of starting points, with roots closer
//! than `root_dedup_radius` merged. Fixed starts can miss roots: a middle root
//! lying between two critical points is never reached from far away, and a
//! multiple root flattens the derivative before Newton's step settles. A
//! second sweep deflates the polynomial by a known root (or by a detected
//! multiple root) and polishes the closed-form candidates of the remainder.
//!
//! Callers must not assume the result holds `degree` roots.

use spectra_core::{Convergence, SolverConfig, SpectraError, Value};
use spectra_plugin::{ArgMeta, EvalContext, FunctionMeta, FunctionPlugin};
use tracing::{debug, warn};
use crate::helpers::{check_arg_count, extract_number, into_value};

/// `a·x³ + b·x² + c·x + d`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

/// Distinct real roots, sorted descending
#[derive(Debug, Clone, PartialEq)]
pub struct RootSet {
    pub roots: Vec<f64>,
    pub convergence: Convergence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Newton {
    Converged { root: f64, iterations: usize },
    FlatDerivative { at: f64 },
    Exhausted { at: f64 },
}

impl Cubic {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Characteristic polynomial `λ³ − c2·λ² + c1·λ − det`
    pub fn characteristic(c2: f64, c1: f64, det: f64) -> Self {
        Self::new(1.0, -c2, c1, -det)
    }

    pub fn eval(&self, x: f64) -> f64 {
        ((self.a * x + self.b) * x + self.c) * x + self.d
    }

    pub fn derivative(&self, x: f64) -> f64 {
        (3.0 * self.a * x + 2.0 * self.b) * x + self.c
    }

    pub fn degree(&self) -> usize {
        if self.a != 0.0 {
            3
        } else if self.b != 0.0 {
            2
        } else if self.c != 0.0 {
            1
        } else {
            0
        }
    }

    /// Sum of coefficient magnitudes, the scale for "f(x) is zero"
    fn scale(&self) -> f64 {
        self.a.abs() + self.b.abs() + self.c.abs() + self.d.abs()
    }

    fn newton(&self, start: f64, config: &SolverConfig) -> Newton {
        let mut x = start;
        for i in 0..config.newton_max_iterations {
            let fp = self.derivative(x);
            if fp.abs() < config.newton_derivative_floor {
                return Newton::FlatDerivative { at: x };
            }

            let x_new = x - self.eval(x) / fp;
            if (x_new - x).abs() < config.newton_step_tolerance {
                return Newton::Converged { root: x_new, iterations: i + 1 };
            }
            x = x_new;
        }
        Newton::Exhausted { at: x }
    }

    /// Coefficients `(p, q, r)` of the quotient `p·x² + q·x + r` of a
    /// division by `(x − root)`
    fn deflate(&self, root: f64) -> (f64, f64, f64) {
        let p = self.a;
        let q = self.b + p * root;
        let r = self.c + q * root;
        (p, q, r)
    }
}

/// Real roots of `p·x² + q·x + r`; a slightly negative discriminant counts
/// as a double root
fn quadratic_candidates(p: f64, q: f64, r: f64, zero_threshold: f64) -> Vec<f64> {
    if p == 0.0 {
        return if q != 0.0 { vec![-r / q] } else { Vec::new() };
    }

    let disc = q * q - 4.0 * p * r;
    let scale = (q * q).max((4.0 * p * r).abs()).max(1.0);
    if disc < -zero_threshold * scale {
        return Vec::new();
    }

    let root = disc.max(0.0).sqrt();
    vec![(-q + root) / (2.0 * p), (-q - root) / (2.0 * p)]
}

struct Accepted<'a> {
    roots: Vec<f64>,
    config: &'a SolverConfig,
}

impl Accepted<'_> {
    fn offer(&mut self, x: f64) -> bool {
        if !x.is_finite() || self.roots.iter().any(|r| (x - r).abs() < self.config.root_dedup_radius) {
            return false;
        }
        self.roots.push(x);
        true
    }
}

/// Solve `a·x³ + b·x² + c·x + d = 0` for its distinct real roots
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64, config: &SolverConfig) -> RootSet {
    solve(&Cubic::new(a, b, c, d), config)
}

pub fn solve(poly: &Cubic, config: &SolverConfig) -> RootSet {
    let mut accepted = Accepted { roots: Vec::new(), config };
    let mut iterations = 0;
    let mut exhausted: Option<f64> = None;

    for &start in &config.newton_starts {
        match poly.newton(start, config) {
            Newton::Converged { root, iterations: used } => {
                iterations += used;
                accepted.offer(root);
            }
            Newton::FlatDerivative { at } => {
                debug!(start, at, "newton start abandoned on flat derivative");
            }
            Newton::Exhausted { at } => {
                iterations += config.newton_max_iterations;
                exhausted = Some(poly.eval(at).abs());
            }
        }
    }

    let degree = poly.degree();
    if accepted.roots.len() < degree {
        deflation_sweep(poly, degree, &mut accepted, config);
    }

    let mut roots = accepted.roots;
    roots.sort_by(|x, y| y.total_cmp(x));

    let convergence = match exhausted {
        Some(residual) => {
            warn!(iterations, residual, "newton root search exhausted its budget");
            Convergence::Exhausted { iterations, residual }
        }
        None => Convergence::Converged { iterations },
    };

    RootSet { roots, convergence }
}

/// Recover roots that no fixed starting point reached
fn deflation_sweep(poly: &Cubic, degree: usize, accepted: &mut Accepted<'_>, config: &SolverConfig) {
    let tiny = config.newton_step_tolerance * poly.scale().max(1.0);

    // A multiple root is a critical point where the polynomial vanishes
    if accepted.roots.is_empty() && degree >= 2 {
        let critical = quadratic_candidates(3.0 * poly.a, 2.0 * poly.b, poly.c, config.zero_threshold);
        for x in critical {
            if poly.eval(x).abs() < tiny {
                accepted.offer(x);
            }
        }
    }

    let Some(anchor) = accepted.roots.iter().copied().reduce(f64::max) else {
        return;
    };

    let (p, q, r) = poly.deflate(anchor);
    let candidates = match degree {
        3 => quadratic_candidates(p, q, r, config.zero_threshold),
        // a quadratic deflates to the line q·x + r
        2 => quadratic_candidates(0.0, q, r, config.zero_threshold),
        _ => Vec::new(),
    };

    for x0 in candidates {
        let polished = match poly.newton(x0, config) {
            Newton::Converged { root, .. } => Some(root),
            Newton::FlatDerivative { at } if poly.eval(at).abs() < tiny => Some(at),
            _ => None,
        };
        if let Some(x) = polished {
            if accepted.offer(x) {
                debug!(root = x, anchor, "root recovered by deflation");
            }
        }
    }
}

// ============================================================================
// CUBIC_ROOTS - Real roots of a cubic polynomial
// ============================================================================

pub struct CubicRootsFn;

static CUBIC_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("a", "Number", "Coefficient of x³ (0 for a quadratic)"),
    ArgMeta::required("b", "Number", "Coefficient of x²"),
    ArgMeta::required("c", "Number", "Coefficient of x"),
    ArgMeta::required("d", "Number", "Constant term"),
];
static CUBIC_EXAMPLES: [&str; 1] = ["cubic_roots(1, -9, 26, -24) → {roots: [4, 3, 2]}"];
static CUBIC_RELATED: [&str; 1] = ["eigenvalues"];

impl FunctionPlugin for CubicRootsFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "cubic_roots",
            description: "Distinct real roots of a·x³ + b·x² + c·x + d, descending",
            usage: "cubic_roots(a, b, c, d)",
            args: &CUBIC_ARGS,
            returns: "Object",
            examples: &CUBIC_EXAMPLES,
            category: "polynomial",
            related: &CUBIC_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        into_value(self.run(args, ctx))
    }
}

impl CubicRootsFn {
    fn run(&self, args: &[Value], ctx: &EvalContext) -> Result<Value, SpectraError> {
        check_arg_count(args, "cubic_roots", 4, 4)?;
        let names = ["a", "b", "c", "d"];
        let mut coeffs = [0.0; 4];
        for (i, name) in names.iter().enumerate() {
            coeffs[i] = extract_number(&args[i], "cubic_roots", name)?;
        }

        let RootSet { roots, convergence } = solve_cubic(coeffs[0], coeffs[1], coeffs[2], coeffs[3], &ctx.config);
        Ok(crate::with_convergence(
            vec![("roots", Value::from(roots))],
            "cubic_roots",
            convergence,
        ))
    }
}
