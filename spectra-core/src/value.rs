//! Runtime values exchanged with function plugins
//!
//! Arguments arrive as values (nested lists for matrices) and results leave
//! as values (objects carrying eigenvalues, vectors and residual checks).
//! Errors are values too, so a failed call never panics.

use crate::{Eigenvalue, Eigenvector, Matrix, SpectraError};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Number(f64),
    Complex(Complex64),
    Text(String),
    Bool(bool),
    Object(HashMap<String, Value>),
    List(Vec<Value>),
    Null,
    Error(SpectraError),
}

impl Value {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Value::Number(n) => Some(Complex64::new(*n, 0.0)),
            Value::Complex(z) => Some(*z),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&SpectraError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ========== Object Field Access ==========

    /// Get field from object. Returns Error value if not found or not an object.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(map) => {
                map.get(key).cloned().unwrap_or_else(|| {
                    Value::Error(SpectraError::undefined_field(key))
                })
            }
            Value::Error(e) => Value::Error(e.clone()),
            _ => Value::Error(SpectraError::type_error("Object", self.type_name())),
        }
    }

    /// Build an object from key/value pairs
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Complex(_) => "Complex",
            Value::Text(_) => "Text",
            Value::Bool(_) => "Bool",
            Value::Object(_) => "Object",
            Value::List(_) => "List",
            Value::Null => "Null",
            Value::Error(_) => "Error",
        }
    }

    /// Serialize for an output collaborator
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Complex(z) => write!(f, "{}", Eigenvalue::Complex(*z)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Object(obj) => {
                let mut keys: Vec<&String> = obj.keys().collect();
                keys.sort();
                let fields: Vec<String> = keys.iter().map(|k| format!("{}: {}", k, obj[*k])).collect();
                write!(f, "{{{}}}", fields.join(", "))
            }
            Value::List(items) => {
                let contents: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", contents.join(", "))
            }
            Value::Null => write!(f, "null"),
            Value::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

// ========== Conversions ==========

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Complex64> for Value {
    fn from(z: Complex64) -> Self {
        Value::Complex(z)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<SpectraError> for Value {
    fn from(e: SpectraError) -> Self {
        Value::Error(e)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::List(v.into_iter().map(Value::Number).collect())
    }
}

impl From<Vec<Complex64>> for Value {
    fn from(v: Vec<Complex64>) -> Self {
        Value::List(v.into_iter().map(Value::Complex).collect())
    }
}

impl From<Eigenvalue> for Value {
    fn from(lambda: Eigenvalue) -> Self {
        match lambda {
            Eigenvalue::Real(x) => Value::Number(x),
            Eigenvalue::Complex(z) => Value::Complex(z),
        }
    }
}

impl From<Eigenvector> for Value {
    fn from(v: Eigenvector) -> Self {
        match v {
            Eigenvector::Real(v) => v.into(),
            Eigenvector::Complex(v) => v.into(),
        }
    }
}

/// Matrices become nested lists of rows
impl From<Matrix<f64>> for Value {
    fn from(m: Matrix<f64>) -> Self {
        Value::List(m.into_rows().into_iter().map(Value::from).collect())
    }
}
