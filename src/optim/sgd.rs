use crate::layers::parameter::Parameter;
use crate::math::matrix::Matrix;
use crate::optim::optimizer::Optimizer;

/// Stochastic gradient descent with optional momentum and L2 weight decay.
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    velocity: Vec<Matrix>,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd {
            learning_rate,
            momentum: 0.0,
            weight_decay: 0.0,
            velocity: Vec::new(),
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Sgd {
        self.momentum = momentum;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Sgd {
        self.weight_decay = weight_decay;
        self
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.momentum != 0.0 && self.velocity.len() != params.len() {
            self.velocity = params
                .iter()
                .map(|p| Matrix::zeros(p.value.rows, p.value.cols))
                .collect();
        }

        for (idx, p) in params.iter_mut().enumerate() {
            let (lr, mu, wd) = (self.learning_rate, self.momentum, self.weight_decay);
            for i in 0..p.value.rows {
                for j in 0..p.value.cols {
                    let mut g = p.grad.data[i][j] + wd * p.value.data[i][j];
                    if mu != 0.0 {
                        let v = &mut self.velocity[idx].data[i][j];
                        *v = mu * *v + g;
                        g = *v;
                    }
                    p.value.data[i][j] -= lr * g;
                }
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(value: f64, grad: f64) -> Parameter {
        let mut p = Parameter::new(Matrix::filled(1, 1, value));
        p.grad = Matrix::filled(1, 1, grad);
        p
    }

    #[test]
    fn plain_step_moves_against_gradient() {
        let mut p = param(1.0, 0.5);
        Sgd::new(0.1).step(&mut [&mut p]);
        assert!((p.value.data[0][0] - 0.95).abs() < 1e-12);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let mut p = param(0.0, 1.0);
        let mut opt = Sgd::new(1.0).with_momentum(0.9);
        opt.step(&mut [&mut p]);
        opt.step(&mut [&mut p]);
        // v1 = 1, v2 = 0.9 + 1 = 1.9
        assert!((p.value.data[0][0] + 2.9).abs() < 1e-12);
    }

    #[test]
    fn weight_decay_shrinks_weights() {
        let mut p = param(2.0, 0.0);
        Sgd::new(0.5).with_weight_decay(0.1).step(&mut [&mut p]);
        assert!((p.value.data[0][0] - 1.9).abs() < 1e-12);
    }
}
