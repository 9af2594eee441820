use crate::error::Result;
use crate::loss::loss_type::Loss;
use crate::math::matrix::Matrix;

/// Keeps log() finite at p ∈ {0, 1}.
const EPS: f64 = 1e-12;

/// Binary cross-entropy; pair with a Sigmoid output layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct BceLoss;

impl Loss for BceLoss {
    /// -mean(y·ln(p+ε) + (1−y)·ln(1−p+ε))
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let per_element = predicted.zip_map(expected, "bce loss", |p, y| {
            -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln())
        })?;
        Ok(per_element.mean())
    }

    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let n = predicted.len() as f64;
        predicted.zip_map(expected, "bce gradient", |p, y| {
            (-(y / (p + EPS)) + (1.0 - y) / (1.0 - p + EPS)) / n
        })
    }

    fn name(&self) -> &'static str {
        "bce"
    }
}
