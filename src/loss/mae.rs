use crate::error::Result;
use crate::loss::loss_type::Loss;
use crate::math::matrix::Matrix;

/// Mean absolute error over every element.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaeLoss;

impl Loss for MaeLoss {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        Ok(predicted.zip_map(expected, "mae loss", |p, y| (p - y).abs())?.mean())
    }

    /// Subgradient sign(p − y) / n, zero where p == y.
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let n = predicted.len() as f64;
        predicted.zip_map(expected, "mae gradient", |p, y| {
            let diff = p - y;
            if diff > 0.0 {
                1.0 / n
            } else if diff < 0.0 {
                -1.0 / n
            } else {
                0.0
            }
        })
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}
