//! Dense row-major matrix and vector types

use crate::{LinalgError, Scalar};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Column vector
pub type Vector<T = f64> = Vec<T>;

/// Dense row-major matrix
///
/// Rows are validated to have equal length at construction; the solvers
/// additionally require the matrix to be square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T = f64> {
    data: Vec<Vec<T>>,
    rows: usize,
    cols: usize,
}

impl<T: Scalar> Matrix<T> {
    /// Create a matrix from a nested list of rows
    pub fn from_rows(data: Vec<Vec<T>>) -> Result<Self, LinalgError> {
        if data.is_empty() || data[0].is_empty() {
            return Err(LinalgError::Empty("matrix"));
        }

        let rows = data.len();
        let cols = data[0].len();

        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(LinalgError::Ragged { row: i, len: row.len(), expected: cols });
            }
        }

        Ok(Self { data, rows, cols })
    }

    /// Build a matrix entry by entry
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..rows)
            .map(|i| (0..cols).map(|j| f(i, j)).collect())
            .collect();
        Self { data, rows, cols }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_fn(rows, cols, |_, _| T::zero())
    }

    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Side length of a square matrix, or `NotSquare`
    pub fn require_square(&self, op: &'static str) -> Result<usize, LinalgError> {
        if !self.is_square() {
            return Err(LinalgError::NotSquare { op, rows: self.rows, cols: self.cols });
        }
        Ok(self.rows)
    }

    /// Shape formatted for error messages
    pub fn shape(&self) -> String {
        format!("{}×{}", self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row]
    }

    pub fn column(&self, col: usize) -> Vector<T> {
        self.data.iter().map(|row| row[col]).collect()
    }

    pub fn set_column(&mut self, col: usize, values: &[T]) {
        for (row, &v) in self.data.iter_mut().zip(values) {
            row[col] = v;
        }
    }

    /// Main diagonal
    pub fn diagonal(&self) -> Vector<T> {
        let n = self.rows.min(self.cols);
        (0..n).map(|i| self.data[i][i]).collect()
    }

    pub fn as_rows(&self) -> &[Vec<T>] {
        &self.data
    }

    pub fn into_rows(self) -> Vec<Vec<T>> {
        self.data
    }

    /// Apply `f` to every entry
    pub fn map<U: Scalar>(&self, mut f: impl FnMut(T) -> U) -> Matrix<U> {
        Matrix::from_fn(self.rows, self.cols, |i, j| f(self.data[i][j]))
    }

    /// Lift into complex arithmetic
    pub fn to_complex(&self) -> Matrix<Complex64> {
        self.map(Scalar::to_complex)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row][col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row][col]
    }
}

impl fmt::Display for Matrix<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, val) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", val)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
