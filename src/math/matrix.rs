use serde::{Deserialize, Serialize};

use crate::error::{Result, RunnerError};

/// Dense row-major matrix of `f64`.
///
/// Rows are samples and columns are features everywhere in the crate, so a
/// batch of `n` inputs of width `d` is an `n × d` matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    #[serde(with = "crate::math::nullable::rows")]
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        }
    }

    /// Builds a matrix from row vectors.
    ///
    /// Fails on empty input, zero-width rows, or rows of differing length.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let cols = match data.first() {
            Some(row) if !row.is_empty() => row.len(),
            Some(_) => return Err(RunnerError::InvalidInput("rows must not be empty".into())),
            None => return Err(RunnerError::InvalidInput("no rows given".into())),
        };
        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(RunnerError::InvalidInput(format!(
                "ragged rows: row 0 has {cols} values but row {i} has {}",
                row.len()
            )));
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data,
        })
    }

    /// Builds an `n × 1` column from a flat slice.
    pub fn column(values: &[f64]) -> Result<Matrix> {
        Matrix::from_rows(values.iter().map(|&v| vec![v]).collect())
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[j][i] = self.data[i][j];
            }
        }
        res
    }

    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| f(x)).collect())
                .collect(),
        }
    }

    /// Element-wise combination of two same-shape matrices.
    pub fn zip_map<F>(&self, other: &Matrix, what: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.ensure_same_shape(other, what)?;
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
                .collect(),
        })
    }

    pub fn ensure_same_shape(&self, other: &Matrix, what: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(RunnerError::shape(
                what,
                format!("{}x{}", self.rows, self.cols),
                format!("{}x{}", other.rows, other.cols),
            ));
        }
        Ok(())
    }

    /// Matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(RunnerError::shape(
                "matrix product",
                format!("{} rows on the right", self.cols),
                rhs.rows,
            ));
        }
        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }
        Ok(res)
    }

    /// Adds a `1 × cols` row to every row of `self`.
    pub fn add_row(&self, row: &Matrix) -> Result<Matrix> {
        if row.rows != 1 || row.cols != self.cols {
            return Err(RunnerError::shape(
                "row broadcast",
                format!("1x{}", self.cols),
                format!("{}x{}", row.rows, row.cols),
            ));
        }
        let bias = &row.data[0];
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|r| r.iter().zip(bias).map(|(x, b)| x + b).collect())
                .collect(),
        })
    }

    /// Column sums as a `1 × cols` row.
    pub fn sum_rows(&self) -> Matrix {
        let mut sums = vec![0.0; self.cols];
        for row in &self.data {
            for (s, x) in sums.iter_mut().zip(row) {
                *s += x;
            }
        }
        Matrix {
            rows: 1,
            cols: self.cols,
            data: vec![sums],
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Row-major flatten.
    pub fn ravel(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.data.iter().flatten().sum::<f64>() / self.len() as f64
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix {
            rows: 0,
            cols: 0,
            data: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidInput(_)));
        assert!(Matrix::from_rows(vec![]).is_err());
        assert!(Matrix::from_rows(vec![vec![]]).is_err());
    }

    #[test]
    fn matmul_matches_hand_computation() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(vec![vec![5.0], vec![6.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.data, vec![vec![17.0], vec![39.0]]);
        assert!(b.matmul(&b).is_err());
    }

    #[test]
    fn broadcast_and_reductions() {
        let a = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let bias = Matrix::from_rows(vec![vec![10.0, 20.0]]).unwrap();
        assert_eq!(a.add_row(&bias).unwrap().data, vec![vec![11.0, 22.0], vec![13.0, 24.0]]);
        assert_eq!(a.sum_rows().data, vec![vec![4.0, 6.0]]);
        assert_eq!(a.transpose().data, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
        assert_eq!(a.ravel(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(a.mean(), 2.5);
    }
}
