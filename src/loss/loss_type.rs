use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loss::{BceLoss, HuberLoss, MaeLoss, MseLoss};
use crate::math::matrix::Matrix;

/// A differentiable training objective.
///
/// `predicted` and `expected` must have the same shape; implementations
/// average over every element so the gradient already carries the `1/n`.
pub trait Loss {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64>;

    /// ∂loss/∂predicted, same shape as `predicted`.
    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix>;

    fn name(&self) -> &'static str;
}

/// Selects one of the built-in losses.
///
/// - `Mse`               : pair with Identity output.
/// - `Mae`               : pair with Identity output.
/// - `Huber`             : Huber with δ = 1.0; pair with Identity output.
/// - `BinaryCrossEntropy`: pair with Sigmoid output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    Mae,
    Huber,
    BinaryCrossEntropy,
}

impl Loss for LossType {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        match self {
            LossType::Mse => MseLoss.loss(predicted, expected),
            LossType::Mae => MaeLoss.loss(predicted, expected),
            LossType::Huber => HuberLoss::default().loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss.loss(predicted, expected),
        }
    }

    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        match self {
            LossType::Mse => MseLoss.gradient(predicted, expected),
            LossType::Mae => MaeLoss.gradient(predicted, expected),
            LossType::Huber => HuberLoss::default().gradient(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss.gradient(predicted, expected),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            LossType::Mse => MseLoss.name(),
            LossType::Mae => MaeLoss.name(),
            LossType::Huber => HuberLoss::default().name(),
            LossType::BinaryCrossEntropy => BceLoss.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;

    fn pair() -> (Matrix, Matrix) {
        (
            Matrix::from_rows(vec![vec![0.2, 0.9], vec![0.6, 0.1]]).unwrap(),
            Matrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap(),
        )
    }

    #[test]
    fn known_values() {
        let (p, y) = pair();
        // squared errors: 0.04, 0.01, 0.16, 0.01
        assert!((LossType::Mse.loss(&p, &y).unwrap() - 0.055).abs() < 1e-12);
        // absolute errors: 0.2, 0.1, 0.4, 0.1
        assert!((LossType::Mae.loss(&p, &y).unwrap() - 0.2).abs() < 1e-12);
        // all errors are inside δ = 1, so Huber is half the MSE
        assert!((LossType::Huber.loss(&p, &y).unwrap() - 0.0275).abs() < 1e-12);
    }

    #[test]
    fn gradients_agree_with_finite_differences() {
        let (p, y) = pair();
        let h = 1e-6;
        for loss in [LossType::Mse, LossType::Huber, LossType::BinaryCrossEntropy] {
            let analytic = loss.gradient(&p, &y).unwrap();
            for i in 0..2 {
                for j in 0..2 {
                    let mut plus = p.clone();
                    plus.data[i][j] += h;
                    let mut minus = p.clone();
                    minus.data[i][j] -= h;
                    let numeric = (loss.loss(&plus, &y).unwrap() - loss.loss(&minus, &y).unwrap()) / (2.0 * h);
                    assert!(
                        (numeric - analytic.data[i][j]).abs() < 1e-5,
                        "{} at ({i},{j})",
                        loss.name()
                    );
                }
            }
        }
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let (p, _) = pair();
        let y = Matrix::zeros(3, 2);
        assert!(matches!(LossType::Mse.loss(&p, &y), Err(RunnerError::ShapeMismatch { .. })));
    }

    #[test]
    fn serde_names_are_snake_case() {
        let json = serde_json::to_string(&LossType::BinaryCrossEntropy).unwrap();
        assert_eq!(json, "\"binary_cross_entropy\"");
    }
}
