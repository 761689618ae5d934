//! Spectra Core - Fundamental types
//!
//! This crate provides the core types used throughout Spectra:
//! - `Matrix` / `Vector`: dense row-major storage over any `Scalar`
//! - `Eigenvalue` / `Eigenvector`: tagged real-or-complex results
//! - `Convergence`: advisory status of iterative solvers
//! - `SolverConfig`: tolerances, iteration caps, free parameter
//! - `Value`: runtime values exchanged with function plugins
//! - `LinalgError` / `SpectraError`: engine errors and their structured form

mod scalar;
mod matrix;
mod spectrum;
mod config;
mod value;
mod error;

pub use scalar::Scalar;
pub use matrix::{Matrix, Vector};
pub use spectrum::{Eigenvalue, Eigenvector, Convergence};
pub use config::SolverConfig;
pub use value::Value;
pub use error::{LinalgError, SpectraError, ErrorContext, Severity, codes};

/// Complex scalar used for complex eigenvalues and eigenvectors
pub use num_complex::Complex64;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Matrix, Vector, Scalar, Complex64,
        Eigenvalue, Eigenvector, Convergence,
        SolverConfig, Value, LinalgError, SpectraError, Severity,
    };
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_from_eigenvalue() {
            let v: Value = Eigenvalue::Real(3.0).into();
            assert_eq!(v.as_number(), Some(3.0));

            let v: Value = Eigenvalue::Complex(Complex64::new(0.0, 1.0)).into();
            assert!(matches!(v, Value::Complex(_)));
            assert_eq!(v.as_complex(), Some(Complex64::new(0.0, 1.0)));
            assert_eq!(v.as_number(), None);
        }

        #[test]
        fn test_from_matrix() {
            let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
            let v: Value = m.into();
            let rows = v.as_list().unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1].as_list().unwrap()[0].as_number(), Some(3.0));
        }

        #[test]
        fn test_object_get() {
            let obj = Value::object([("n", Value::from(2usize))]);
            assert_eq!(obj.get("n").as_number(), Some(2.0));
            assert!(obj.get("missing").is_error());
            assert!(Value::Null.get("n").is_error());
        }

        #[test]
        fn test_type_name() {
            assert_eq!(Value::Number(0.0).type_name(), "Number");
            assert_eq!(Value::Complex(Complex64::new(0.0, 0.0)).type_name(), "Complex");
            assert_eq!(Value::Text(String::new()).type_name(), "Text");
            assert_eq!(Value::Null.type_name(), "Null");
        }

        #[test]
        fn test_to_json() {
            let v = Value::from(vec![1.0, 2.0]);
            let json = v.to_json();
            assert_eq!(json["type"], "List");
            assert_eq!(json["value"][0]["value"], 1.0);
        }

        #[test]
        fn test_display() {
            let v = Value::object([("b", Value::from(true)), ("a", Value::from(vec![1.0, 2.5]))]);
            assert_eq!(v.to_string(), "{a: [1, 2.5], b: true}");
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_from_linalg_error() {
            let err: SpectraError = LinalgError::UnsupportedDimension {
                op: "eigenvalues",
                n: 4,
                supported: "2 or 3",
            }.into();
            assert_eq!(err.code, codes::UNSUPPORTED_DIMENSION);
            assert!(err.message.contains("4×4"));
            assert!(err.suggestion.is_some());
        }

        #[test]
        fn test_complex_unsupported_code() {
            let err: SpectraError = LinalgError::ComplexEigenvaluesUnsupported { re: 0.0, im: 1.0 }.into();
            assert_eq!(err.code, codes::COMPLEX_UNSUPPORTED);
            assert_eq!(err.severity, Severity::Error);
        }

        #[test]
        fn test_non_convergence_is_warning() {
            let err = SpectraError::non_convergence("qr_eigenvalues", 1000, 0.7);
            assert!(err.is_warning());
            assert_eq!(err.code, codes::NON_CONVERGENCE);
        }

        #[test]
        fn test_error_with_context() {
            let err = SpectraError::arg_type("eigen", "matrix", "List", "Text")
                .with_note("from first argument");
            let ctx = err.context.unwrap();
            assert_eq!(ctx.function, Some("eigen".to_string()));
            assert_eq!(ctx.argument, Some("matrix".to_string()));
            assert_eq!(ctx.notes.len(), 1);
        }

        #[test]
        fn test_error_display() {
            let err = SpectraError::domain_error("bad input");
            let display = format!("{}", err);
            assert!(display.contains("DOMAIN_ERROR"));
        }
    }
}
