use serde::{Deserialize, Serialize};

use crate::layers::parameter::Parameter;
use crate::optim::adam::Adam;
use crate::optim::sgd::Sgd;

/// Updates parameters from their accumulated gradients.
pub trait Optimizer {
    fn step(&mut self, params: &mut [&mut Parameter]);

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, lr: f64);
}

/// A recipe for an optimizer, built against the learning rate at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerKind {
    Sgd {
        momentum: f64,
        weight_decay: f64,
    },
    Adam {
        beta1: f64,
        beta2: f64,
        eps: f64,
        weight_decay: f64,
    },
}

impl OptimizerKind {
    pub fn sgd() -> Self {
        OptimizerKind::Sgd {
            momentum: 0.0,
            weight_decay: 0.0,
        }
    }

    pub fn adam() -> Self {
        OptimizerKind::Adam {
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay: 0.0,
        }
    }

    pub fn build(&self, lr: f64) -> Box<dyn Optimizer> {
        match *self {
            OptimizerKind::Sgd {
                momentum,
                weight_decay,
            } => Box::new(Sgd::new(lr).with_momentum(momentum).with_weight_decay(weight_decay)),
            OptimizerKind::Adam {
                beta1,
                beta2,
                eps,
                weight_decay,
            } => Box::new(Adam::new(lr, beta1, beta2, eps).with_weight_decay(weight_decay)),
        }
    }
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::sgd()
    }
}
