use crate::error::Result;
use crate::loss::loss_type::Loss;
use crate::math::matrix::Matrix;

/// Huber loss with threshold `delta`.
///
/// h(x) = 0.5·x²            if |x| ≤ δ
///        δ·(|x| − 0.5·δ)   otherwise
#[derive(Debug, Clone, Copy)]
pub struct HuberLoss {
    pub delta: f64,
}

impl Default for HuberLoss {
    fn default() -> Self {
        HuberLoss { delta: 1.0 }
    }
}

impl Loss for HuberLoss {
    fn loss(&self, predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let delta = self.delta;
        let per_element = predicted.zip_map(expected, "huber loss", |p, y| {
            let x = p - y;
            if x.abs() <= delta {
                0.5 * x * x
            } else {
                delta * (x.abs() - 0.5 * delta)
            }
        })?;
        Ok(per_element.mean())
    }

    fn gradient(&self, predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        let n = predicted.len() as f64;
        let delta = self.delta;
        predicted.zip_map(expected, "huber gradient", |p, y| {
            let x = p - y;
            let g = if x.abs() <= delta { x } else { delta * x.signum() };
            g / n
        })
    }

    fn name(&self) -> &'static str {
        "huber"
    }
}
