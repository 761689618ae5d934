//! Evaluation Context

use spectra_core::{SolverConfig, Value};
use crate::PluginRegistry;
use std::sync::Arc;

/// Evaluation context passed to plugins
///
/// Holds no mutable state; one context can serve concurrent calls.
pub struct EvalContext {
    pub config: SolverConfig,
    pub registry: Arc<PluginRegistry>,
}

impl EvalContext {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            config: SolverConfig::default(),
            registry,
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    pub fn with_free_parameter(mut self, t: f64) -> Self {
        self.config.free_parameter = t;
        self
    }

    /// Call a registered function by name
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        self.registry.call_function(name, args, self)
    }
}
