use std::fmt;

use serde::{Deserialize, Serialize};

/// Element-wise activation applied after a dense layer's affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Identity,
    Sigmoid,
    ReLU,
    Tanh,
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Softplus,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Identity => x,
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => if x > 0.0 { x } else { alpha * x.exp_m1() },
            // ln(1 + e^x) without overflow for large x.
            ActivationFunction::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
        }
    }

    /// Derivative evaluated at the pre-activation `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { alpha },
            ActivationFunction::Elu { alpha } => if x > 0.0 { 1.0 } else { alpha * x.exp() },
            ActivationFunction::Softplus => sigmoid(x),
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFunction::Identity => write!(f, "Identity"),
            ActivationFunction::Sigmoid => write!(f, "Sigmoid"),
            ActivationFunction::ReLU => write!(f, "ReLU"),
            ActivationFunction::Tanh => write!(f, "Tanh"),
            ActivationFunction::LeakyReLU { alpha } => write!(f, "LeakyReLU(alpha={alpha})"),
            ActivationFunction::Elu { alpha } => write!(f, "ELU(alpha={alpha})"),
            ActivationFunction::Softplus => write!(f, "Softplus"),
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ActivationFunction; 7] = [
        ActivationFunction::Identity,
        ActivationFunction::Sigmoid,
        ActivationFunction::ReLU,
        ActivationFunction::Tanh,
        ActivationFunction::LeakyReLU { alpha: 0.01 },
        ActivationFunction::Elu { alpha: 1.0 },
        ActivationFunction::Softplus,
    ];

    #[test]
    fn derivatives_agree_with_finite_differences() {
        let h = 1e-6;
        for act in ALL {
            for x in [-2.0, -0.5, 0.3, 1.7] {
                let numeric = (act.function(x + h) - act.function(x - h)) / (2.0 * h);
                assert!(
                    (numeric - act.derivative(x)).abs() < 1e-5,
                    "{act} at {x}: numeric {numeric} vs analytic {}",
                    act.derivative(x)
                );
            }
        }
    }

    #[test]
    fn softplus_is_stable_for_large_inputs() {
        assert_eq!(ActivationFunction::Softplus.function(1000.0), 1000.0);
        assert!(ActivationFunction::Softplus.function(-1000.0) >= 0.0);
    }
}
