use crate::error::Result;
use crate::loss::loss_type::Loss;
use crate::math::matrix::Matrix;

/// Mean squared error over every element.
#[derive(Debug, Default, Clone, Copy)]
pub struct MseLoss;

impl Loss for MseLoss {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        Ok(predicted.zip_map(expected, "mse loss", |p, y| (p - y).powi(2))?.mean())
    }

    /// 2·(p − y) / n
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let n = predicted.len() as f64;
        predicted.zip_map(expected, "mse gradient", |p, y| 2.0 * (p - y) / n)
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}
