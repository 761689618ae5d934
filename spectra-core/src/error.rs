//! Errors for the eigen engine
//!
//! Two layers: [`LinalgError`] is what the numerical routines return and
//! propagate with `?`. [`SpectraError`] is the structured value handed to
//! callers of the function plugins, with a machine-readable code, a
//! suggestion and a severity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for numerical operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    #[error("{op}: dimension mismatch, {left} vs {right}")]
    DimensionMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("{op}: unsupported dimension {n}×{n} (supported: {supported})")]
    UnsupportedDimension {
        op: &'static str,
        n: usize,
        supported: &'static str,
    },

    #[error("complex eigenvalues {re} ± {im}i cannot be represented as real numbers")]
    ComplexEigenvaluesUnsupported { re: f64, im: f64 },

    #[error("{op}: requires a square matrix, got {rows}×{cols}")]
    NotSquare {
        op: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("{0}: matrix is empty")]
    Empty(&'static str),

    #[error("row {row} has {len} columns, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },

    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Standard error codes (machine-readable)
pub mod codes {
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const UNSUPPORTED_DIMENSION: &str = "UNSUPPORTED_DIMENSION";
    pub const COMPLEX_UNSUPPORTED: &str = "COMPLEX_UNSUPPORTED";
    pub const NON_CONVERGENCE: &str = "NON_CONVERGENCE";
    pub const NOT_SQUARE: &str = "NOT_SQUARE";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const UNDEFINED_FIELD: &str = "UNDEFINED_FIELD";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Computation continued with degraded result
    Warning,
    /// Computation failed for this call
    Error,
    /// Engine misuse or internal bug
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Function that raised the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Argument that caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectraError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl SpectraError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set function context
    pub fn in_function(mut self, function: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.function = Some(function.into());
        self
    }

    /// Builder: set argument context
    pub fn for_argument(mut self, argument: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.argument = Some(argument.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    // ========== Common Error Constructors ==========

    pub fn undefined_func(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FUNC, format!("Unknown function: {}", name))
            .with_suggestion("Check the registry for available functions")
    }

    pub fn undefined_field(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FIELD, format!("Undefined field: {}", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE, format!("Expected {}, got {}", expected, got))
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got))
            .in_function(func)
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", func, arg, expected, got))
            .in_function(func)
            .for_argument(arg)
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    /// Advisory: an iterative solver ran out of budget
    pub fn non_convergence(solver: &str, iterations: usize, residual: f64) -> Self {
        Self::new(codes::NON_CONVERGENCE, format!(
            "{} did not converge after {} iterations (residual {:e})",
            solver, iterations, residual
        ))
        .with_suggestion("Verify results with A·v ≈ λ·v or raise max_iterations")
        .with_severity(Severity::Warning)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for SpectraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for SpectraError {}

impl From<LinalgError> for SpectraError {
    fn from(err: LinalgError) -> Self {
        let message = err.to_string();
        match err {
            LinalgError::DimensionMismatch { .. } => Self::new(codes::DIMENSION_MISMATCH, message)
                .with_suggestion("Operands must have compatible shapes"),
            LinalgError::UnsupportedDimension { .. } => Self::new(codes::UNSUPPORTED_DIMENSION, message)
                .with_suggestion("Use qr_eigenvalues or power_iteration for other sizes"),
            LinalgError::ComplexEigenvaluesUnsupported { .. } => Self::new(codes::COMPLEX_UNSUPPORTED, message)
                .with_suggestion("Use the complex-capable eigenvalues() instead"),
            LinalgError::NotSquare { .. } => Self::new(codes::NOT_SQUARE, message),
            LinalgError::Empty(_) | LinalgError::Ragged { .. } => Self::domain_error(message),
            LinalgError::InvalidConfig(_) => Self::new(codes::INVALID_CONFIG, message)
                .with_severity(Severity::Fatal),
        }
    }
}
