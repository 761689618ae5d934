//! Helper functions for turning plugin arguments into engine inputs

use spectra_core::{Complex64, Eigenvalue, Matrix, SpectraError, Value, Vector};

/// Fail unless `args.len()` lies in `min..=max`
pub fn check_arg_count(args: &[Value], func: &str, min: usize, max: usize) -> Result<(), SpectraError> {
    if args.len() < min || args.len() > max {
        return Err(SpectraError::arg_count(func, min, args.len()));
    }
    Ok(())
}

/// Extract a finite real number from a Value
pub fn extract_number(value: &Value, func: &str, arg: &str) -> Result<f64, SpectraError> {
    match value {
        Value::Number(n) if n.is_finite() => Ok(*n),
        Value::Number(n) => Err(SpectraError::domain_error(format!(
            "{}: {} must be finite, got {}", func, arg, n
        ))),
        Value::Error(e) => Err(e.clone()),
        _ => Err(SpectraError::arg_type(func, arg, "Number", value.type_name())),
    }
}

/// Extract a list of real numbers from a Value
pub fn extract_vector(value: &Value, func: &str, arg: &str) -> Result<Vector, SpectraError> {
    match value {
        Value::List(items) => {
            let mut numbers = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Number(n) => numbers.push(*n),
                    _ => return Err(SpectraError::domain_error(format!(
                        "{}: {} element {} must be a Number", func, arg, i
                    ))),
                }
            }
            if numbers.is_empty() {
                return Err(SpectraError::domain_error(format!("{}: {} cannot be empty", func, arg)));
            }
            Ok(numbers)
        }
        Value::Error(e) => Err(e.clone()),
        _ => Err(SpectraError::arg_type(func, arg, "List", value.type_name())),
    }
}

/// Extract a real matrix from a nested list of rows
pub fn extract_matrix(value: &Value, func: &str, arg: &str) -> Result<Matrix, SpectraError> {
    let rows = match value {
        Value::List(rows) => rows,
        Value::Error(e) => return Err(e.clone()),
        _ => return Err(SpectraError::arg_type(func, arg, "Matrix", value.type_name())),
    };

    if rows.is_empty() {
        return Err(SpectraError::domain_error(format!("{}: {} cannot be empty", func, arg)));
    }

    let mut data = Vec::with_capacity(rows.len());
    for (i, row_val) in rows.iter().enumerate() {
        match row_val {
            Value::List(cols) => {
                let mut row = Vec::with_capacity(cols.len());
                for (j, col_val) in cols.iter().enumerate() {
                    match col_val {
                        Value::Number(n) if n.is_finite() => row.push(*n),
                        _ => return Err(SpectraError::domain_error(format!(
                            "{}: {}[{}][{}] must be a finite Number", func, arg, i, j
                        ))),
                    }
                }
                data.push(row);
            }
            _ => return Err(SpectraError::domain_error(format!(
                "{}: {} row {} must be a list", func, arg, i
            ))),
        }
    }

    Matrix::from_rows(data).map_err(|e| SpectraError::from(e).in_function(func).for_argument(arg))
}

/// Extract a square real matrix
pub fn extract_square_matrix(value: &Value, func: &str, arg: &str) -> Result<Matrix, SpectraError> {
    let m = extract_matrix(value, func, arg)?;
    m.require_square("input").map_err(|e| SpectraError::from(e).in_function(func))?;
    Ok(m)
}

/// Extract an eigenvalue: a Number, a Complex, or an object `{re, im}`
pub fn extract_eigenvalue(value: &Value, func: &str, arg: &str) -> Result<Eigenvalue, SpectraError> {
    match value {
        Value::Number(n) => Ok(Eigenvalue::Real(*n)),
        Value::Complex(z) if z.im == 0.0 => Ok(Eigenvalue::Real(z.re)),
        Value::Complex(z) => Ok(Eigenvalue::Complex(*z)),
        Value::Object(obj) => {
            let re = obj.get("re").map(|v| extract_number(v, func, "re")).transpose()?;
            let im = obj.get("im").map(|v| extract_number(v, func, "im")).transpose()?;
            match (re, im) {
                (Some(re), None) => Ok(Eigenvalue::Real(re)),
                (Some(re), Some(im)) if im == 0.0 => Ok(Eigenvalue::Real(re)),
                (Some(re), Some(im)) => Ok(Eigenvalue::Complex(Complex64::new(re, im))),
                _ => Err(SpectraError::arg_type(func, arg, "{re, im}", "Object")),
            }
        }
        Value::Error(e) => Err(e.clone()),
        _ => Err(SpectraError::arg_type(func, arg, "Number or Complex", value.type_name())),
    }
}

/// Extract a square matrix given as a list of rows of Numbers
pub fn matrix_arg(args: &[Value], index: usize, func: &str) -> Result<Matrix, SpectraError> {
    match args.get(index) {
        Some(v) => extract_square_matrix(v, func, "matrix"),
        None => Err(SpectraError::arg_count(func, index + 1, args.len())),
    }
}

/// Unwrap a plugin result, turning errors into `Value::Error`
pub fn into_value(result: Result<Value, SpectraError>) -> Value {
    result.unwrap_or_else(Value::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_core::codes;

    fn list(values: &[f64]) -> Value {
        Value::from(values.to_vec())
    }

    #[test]
    fn test_extract_matrix() {
        let val = Value::List(vec![list(&[1.0, 2.0]), list(&[3.0, 4.0])]);
        let m = extract_matrix(&val, "test", "m").unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m[(1, 0)], 3.0);
    }

    #[test]
    fn test_extract_matrix_rejects_ragged() {
        let val = Value::List(vec![list(&[1.0, 2.0]), list(&[3.0])]);
        let err = extract_matrix(&val, "test", "m").unwrap_err();
        assert_eq!(err.code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_extract_square_matrix_rejects_rectangular() {
        let val = Value::List(vec![list(&[1.0, 2.0, 3.0]), list(&[3.0, 4.0, 5.0])]);
        let err = extract_square_matrix(&val, "test", "m").unwrap_err();
        assert_eq!(err.code, codes::NOT_SQUARE);
    }

    #[test]
    fn test_extract_matrix_rejects_nan() {
        let val = Value::List(vec![list(&[1.0, f64::NAN]), list(&[3.0, 4.0])]);
        assert!(extract_matrix(&val, "test", "m").is_err());
    }

    #[test]
    fn test_extract_eigenvalue_forms() {
        assert_eq!(extract_eigenvalue(&Value::Number(2.0), "t", "l").unwrap(), Eigenvalue::Real(2.0));

        let obj = Value::object([("re", Value::Number(1.0)), ("im", Value::Number(-1.0))]);
        assert_eq!(
            extract_eigenvalue(&obj, "t", "l").unwrap(),
            Eigenvalue::Complex(Complex64::new(1.0, -1.0))
        );

        let obj = Value::object([("im", Value::Number(1.0))]);
        assert!(extract_eigenvalue(&obj, "t", "l").is_err());
        assert!(extract_eigenvalue(&Value::Text("x".into()), "t", "l").is_err());
    }

    #[test]
    fn test_check_arg_count() {
        assert!(check_arg_count(&[Value::Null], "f", 1, 2).is_ok());
        assert!(check_arg_count(&[], "f", 1, 2).is_err());
    }
}
