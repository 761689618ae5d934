//! Solver configuration
//!
//! Every knob has a default, so callers override only what they need, either
//! through the builder methods or a JSON object with the same field names.

use crate::LinalgError;
use serde::{Deserialize, Serialize};

/// Tuning parameters shared by all solvers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// QR iteration stops once the largest off-diagonal entry is below this
    pub tolerance: f64,
    /// Hard cap on QR iterations
    pub max_iterations: usize,
    /// Fixed number of power-iteration steps
    pub power_iterations: usize,
    /// Newton steps allowed per starting point
    pub newton_max_iterations: usize,
    /// Newton converges when successive iterates differ by less than this
    pub newton_step_tolerance: f64,
    /// A start is abandoned when |f'(x)| drops below this
    pub newton_derivative_floor: f64,
    /// Roots closer than this are the same root
    pub root_dedup_radius: f64,
    /// Newton starting points
    pub newton_starts: Vec<f64>,
    /// Magnitude below which a pivot, residual or discriminant is zero
    pub zero_threshold: f64,
    /// Relative residual a recovered eigenvector must meet before it is
    /// accepted without row reduction
    pub residual_tolerance: f64,
    /// Scale of the returned member of an eigenvector family
    pub free_parameter: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
            power_iterations: 100,
            newton_max_iterations: 100,
            newton_step_tolerance: 1e-6,
            newton_derivative_floor: 1e-6,
            root_dedup_radius: 1e-2,
            newton_starts: vec![-10.0, 0.0, 10.0],
            zero_threshold: 1e-10,
            residual_tolerance: 1e-6,
            free_parameter: 1.0,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, LinalgError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| LinalgError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_power_iterations(mut self, iterations: usize) -> Self {
        self.power_iterations = iterations;
        self
    }

    pub fn with_newton_starts(mut self, starts: Vec<f64>) -> Self {
        self.newton_starts = starts;
        self
    }

    pub fn with_free_parameter(mut self, t: f64) -> Self {
        self.free_parameter = t;
        self
    }

    /// Reject settings that would make a solver meaningless or non-terminating
    pub fn validate(&self) -> Result<(), LinalgError> {
        let positive = [
            ("tolerance", self.tolerance),
            ("newton_step_tolerance", self.newton_step_tolerance),
            ("newton_derivative_floor", self.newton_derivative_floor),
            ("root_dedup_radius", self.root_dedup_radius),
            ("zero_threshold", self.zero_threshold),
            ("residual_tolerance", self.residual_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LinalgError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}", name, value
                )));
            }
        }

        if self.max_iterations == 0 || self.newton_max_iterations == 0 {
            return Err(LinalgError::InvalidConfig("iteration caps must be at least 1".to_string()));
        }
        if self.newton_starts.is_empty() || self.newton_starts.iter().any(|x| !x.is_finite()) {
            return Err(LinalgError::InvalidConfig("newton_starts must be non-empty and finite".to_string()));
        }
        if !self.free_parameter.is_finite() || self.free_parameter == 0.0 {
            return Err(LinalgError::InvalidConfig(format!(
                "free_parameter must be finite and nonzero, got {}", self.free_parameter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.newton_starts, vec![-10.0, 0.0, 10.0]);
        assert_eq!(config.tolerance, 1e-10);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SolverConfig::from_json(r#"{"max_iterations": 50, "free_parameter": -2.0}"#).unwrap();
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.free_parameter, -2.0);
        assert_eq!(config.power_iterations, 100);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            SolverConfig::from_json(r#"{"tolerance": -1.0}"#),
            Err(LinalgError::InvalidConfig(_))
        ));
        assert!(SolverConfig::from_json(r#"{"max_iterations": 0}"#).is_err());
        assert!(SolverConfig::from_json(r#"{"newton_starts": []}"#).is_err());
        assert!(SolverConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_tolerance(1e-8)
            .with_max_iterations(10)
            .with_free_parameter(3.0);
        assert_eq!(config.tolerance, 1e-8);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.free_parameter, 3.0);
    }
}
