use crate::layers::parameter::Parameter;
use crate::math::matrix::Matrix;
use crate::optim::optimizer::Optimizer;

/// Adam with bias-corrected first and second moment estimates.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub eps: f64,
    pub weight_decay: f64,
    t: i32,
    m: Vec<Matrix>,
    v: Vec<Matrix>,
}

impl Adam {
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, eps: f64) -> Adam {
        Adam {
            learning_rate,
            beta1,
            beta2,
            eps,
            weight_decay: 0.0,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Adam {
        self.weight_decay = weight_decay;
        self
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Parameter]) {
        if self.m.len() != params.len() {
            self.m = params
                .iter()
                .map(|p| Matrix::zeros(p.value.rows, p.value.cols))
                .collect();
            self.v = self.m.clone();
            self.t = 0;
        }
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        let (beta1, beta2, eps, wd) = (self.beta1, self.beta2, self.eps, self.weight_decay);
        for (idx, p) in params.iter_mut().enumerate() {
            for i in 0..p.value.rows {
                for j in 0..p.value.cols {
                    let g = p.grad.data[i][j] + wd * p.value.data[i][j];
                    let m = &mut self.m[idx].data[i][j];
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    let m_hat = *m / bias1;
                    let v = &mut self.v[idx].data[i][j];
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let v_hat = *v / bias2;
                    p.value.data[i][j] -= self.learning_rate * m_hat / (v_hat.sqrt() + eps);
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

    #[test]
    fn first_step_has_magnitude_lr() {
        // With bias correction the first update is lr · g/|g|.
        let mut p = Parameter::new(Matrix::filled(1, 2, 1.0));
        p.grad = Matrix::from_rows(vec![vec![3.0, -0.01]]).unwrap();
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        opt.step(&mut [&mut p]);
        assert!((p.value.data[0][0] - 0.9).abs() < 1e-6);
        assert!((p.value.data[0][1] - 1.1).abs() < 1e-4);
    }

    #[test]
    fn minimises_a_quadratic() {
        let mut p = Parameter::new(Matrix::filled(1, 1, 5.0));
        let mut opt = Adam::new(0.1, 0.9, 0.999, 1e-8);
        for _ in 0..1000 {
            p.grad = p.value.scale(2.0);
            opt.step(&mut [&mut p]);
        }
        assert!(p.value.data[0][0].abs() < 0.1);
    }
}
