use std::fmt;

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, RunnerError};
use crate::layers::parameter::Parameter;
use crate::math::matrix::Matrix;

/// Fully connected layer computing `f(x·W + b)` over a batch of rows.
#[derive(Debug, Clone)]
pub struct Dense {
    pub size: usize,
    pub input_size: usize,
    pub weights: Parameter, // input_size × size
    pub biases: Parameter,  // 1 × size
    pub activator: ActivationFunction,
    cache: Option<ForwardCache>,
}

/// What `backward` needs from the last `forward`.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Matrix,
    pre_activation: Matrix,
}

impl Dense {
    /// New layer with zero weights; the runner applies an `Init` on attach.
    pub fn new(size: usize, input_size: usize, activation: ActivationFunction) -> Dense {
        Dense {
            size,
            input_size,
            weights: Parameter::new(Matrix::zeros(input_size, size)),
            biases: Parameter::new(Matrix::zeros(1, size)),
            activator: activation,
            cache: None,
        }
    }

    pub fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        if input.cols != self.input_size {
            return Err(RunnerError::shape(
                "dense layer input width",
                self.input_size,
                input.cols,
            ));
        }
        let z = input.matmul(&self.weights.value)?.add_row(&self.biases.value)?;
        let a = z.map(|x| self.activator.function(x));
        self.cache = Some(ForwardCache {
            input: input.clone(),
            pre_activation: z,
        });
        Ok(a)
    }

    /// Accumulates parameter gradients from `grad_output` (∂L/∂a) and returns
    /// ∂L/∂input for the previous layer.
    pub fn backward(&mut self, grad_output: &Matrix) -> Result<Matrix> {
        let cache = self
            .cache
            .as_ref()
            .ok_or_else(|| RunnerError::InvalidState("backward called before forward".into()))?;

        // δ = ∂L/∂a ⊙ f'(z)
        let act_derivative = cache.pre_activation.map(|x| self.activator.derivative(x));
        let delta = grad_output.zip_map(&act_derivative, "dense layer gradient", |g, d| g * d)?;

        let w_grad = cache.input.transpose().matmul(&delta)?;
        let b_grad = delta.sum_rows();
        let grad_input = delta.matmul(&self.weights.value.transpose())?;

        self.weights.grad = self.weights.grad.zip_map(&w_grad, "weight gradient", |a, b| a + b)?;
        self.biases.grad = self.biases.grad.zip_map(&b_grad, "bias gradient", |a, b| a + b)?;

        Ok(grad_input)
    }
}

impl fmt::Display for Dense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dense(in_features={}, out_features={}, activation={})",
            self.input_size, self.size, self.activator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> Dense {
        let mut layer = Dense::new(2, 3, ActivationFunction::Tanh);
        layer.weights.value =
            Matrix::from_rows(vec![vec![0.1, -0.2], vec![0.4, 0.3], vec![-0.5, 0.2]]).unwrap();
        layer.biases.value = Matrix::from_rows(vec![vec![0.05, -0.1]]).unwrap();
        layer
    }

    #[test]
    fn forward_rejects_wrong_width() {
        let mut layer = layer();
        let x = Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(layer.forward(&x), Err(RunnerError::ShapeMismatch { .. })));
    }

    #[test]
    fn backward_before_forward_is_an_error() {
        let mut layer = layer();
        let g = Matrix::zeros(1, 2);
        assert!(matches!(layer.backward(&g), Err(RunnerError::InvalidState(_))));
    }

    #[test]
    fn weight_gradient_matches_finite_differences() {
        let x = Matrix::from_rows(vec![vec![0.5, -1.0, 2.0], vec![1.5, 0.2, -0.3]]).unwrap();
        // L = sum(a), so ∂L/∂a is all ones.
        let objective = |l: &mut Dense| l.forward(&x).unwrap().ravel().iter().sum::<f64>();

        let mut analytic = layer();
        analytic.forward(&x).unwrap();
        analytic.backward(&Matrix::filled(2, 2, 1.0)).unwrap();

        let h = 1e-6;
        for i in 0..3 {
            for j in 0..2 {
                let mut plus = layer();
                plus.weights.value.data[i][j] += h;
                let mut minus = layer();
                minus.weights.value.data[i][j] -= h;
                let numeric = (objective(&mut plus) - objective(&mut minus)) / (2.0 * h);
                assert!((numeric - analytic.weights.grad.data[i][j]).abs() < 1e-6);
            }
        }
    }
}
