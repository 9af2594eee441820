use ndarray::{Array1, Array2, ArrayView2};

use crate::error::{Result, RunnerError};
use crate::math::matrix::Matrix;

/// Conversion of caller data into the runner's `Matrix`.
///
/// Rows are samples. One-dimensional inputs become a single column.
/// Empty or ragged data is rejected with `RunnerError::InvalidInput`.
pub trait IntoMatrix {
    fn into_matrix(self) -> Result<Matrix>;
}

impl IntoMatrix for Matrix {
    fn into_matrix(self) -> Result<Matrix> {
        if self.is_empty() {
            return Err(RunnerError::InvalidInput("matrix is empty".into()));
        }
        Matrix::from_rows(self.data)
    }
}

impl IntoMatrix for &Matrix {
    fn into_matrix(self) -> Result<Matrix> {
        self.clone().into_matrix()
    }
}

impl IntoMatrix for Vec<Vec<f64>> {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::from_rows(self)
    }
}

impl IntoMatrix for &[Vec<f64>] {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::from_rows(self.to_vec())
    }
}

impl IntoMatrix for Vec<f64> {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::column(&self)
    }
}

impl IntoMatrix for &[f64] {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::column(self)
    }
}

impl IntoMatrix for ArrayView2<'_, f64> {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::from_rows(self.outer_iter().map(|row| row.to_vec()).collect())
    }
}

impl IntoMatrix for &Array2<f64> {
    fn into_matrix(self) -> Result<Matrix> {
        self.view().into_matrix()
    }
}

impl IntoMatrix for Array2<f64> {
    fn into_matrix(self) -> Result<Matrix> {
        self.view().into_matrix()
    }
}

impl IntoMatrix for Array1<f64> {
    fn into_matrix(self) -> Result<Matrix> {
        Matrix::column(&self.to_vec())
    }
}

impl From<&Matrix> for Array2<f64> {
    fn from(m: &Matrix) -> Self {
        Array2::from_shape_fn((m.rows, m.cols), |(i, j)| m.data[i][j])
    }
}
