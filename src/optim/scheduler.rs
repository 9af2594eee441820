//! Learning-rate schedulers.
//!
//! Epoch-driven schedulers step at the start of every epoch. The plateau
//! scheduler instead steps with the epoch's loss once it is known.

use serde::{Deserialize, Serialize};

use crate::optim::optimizer::Optimizer;

pub trait LrScheduler {
    /// Advances the schedule and writes the new rate into `optimizer`.
    /// `metric` is only consulted by plateau schedulers.
    fn step(&mut self, optimizer: &mut dyn Optimizer, metric: Option<f64>);

    /// True when the schedule is driven by the loss rather than the epoch count.
    fn is_plateau(&self) -> bool {
        false
    }
}

/// A recipe for a scheduler, built when `fit` builds the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerKind {
    /// `lr = base · gamma^(epoch / step_size)`
    StepLr { step_size: usize, gamma: f64 },
    /// `lr = base · gamma^epoch`
    ExponentialLr { gamma: f64 },
    /// Multiplies the rate by `factor` after `patience` epochs without a
    /// relative improvement of `threshold`.
    ReduceLrOnPlateau {
        factor: f64,
        patience: usize,
        threshold: f64,
        cooldown: usize,
        min_lr: f64,
    },
}

impl SchedulerKind {
    pub fn plateau() -> Self {
        SchedulerKind::ReduceLrOnPlateau {
            factor: 0.1,
            patience: 10,
            threshold: 1e-4,
            cooldown: 0,
            min_lr: 0.0,
        }
    }

    pub fn build(&self) -> Box<dyn LrScheduler> {
        match *self {
            SchedulerKind::StepLr { step_size, gamma } => Box::new(StepLr {
                step_size,
                gamma,
                epoch: 0,
                base_lr: None,
            }),
            SchedulerKind::ExponentialLr { gamma } => Box::new(StepLr {
                step_size: 1,
                gamma,
                epoch: 0,
                base_lr: None,
            }),
            SchedulerKind::ReduceLrOnPlateau {
                factor,
                patience,
                threshold,
                cooldown,
                min_lr,
            } => Box::new(ReduceLrOnPlateau {
                factor,
                patience,
                threshold,
                cooldown,
                min_lr,
                best: f64::INFINITY,
                bad_epochs: 0,
                cooldown_left: 0,
            }),
        }
    }
}

/// Step decay; exponential decay is the `step_size == 1` case.
pub struct StepLr {
    step_size: usize,
    gamma: f64,
    epoch: usize,
    base_lr: Option<f64>,
}

impl LrScheduler for StepLr {
    fn step(&mut self, optimizer: &mut dyn Optimizer, _metric: Option<f64>) {
        let base = *self.base_lr.get_or_insert_with(|| optimizer.learning_rate());
        self.epoch += 1;
        if self.step_size == 0 {
            return;
        }
        let decays = (self.epoch / self.step_size) as i32;
        optimizer.set_learning_rate(base * self.gamma.powi(decays));
    }
}

pub struct ReduceLrOnPlateau {
    factor: f64,
    patience: usize,
    threshold: f64,
    cooldown: usize,
    min_lr: f64,
    best: f64,
    bad_epochs: usize,
    cooldown_left: usize,
}

impl LrScheduler for ReduceLrOnPlateau {
    fn step(&mut self, optimizer: &mut dyn Optimizer, metric: Option<f64>) {
        let Some(current) = metric else {
            log::warn!("plateau scheduler stepped without a metric; ignoring");
            return;
        };

        if current < self.best * (1.0 - self.threshold) {
            self.best = current;
            self.bad_epochs = 0;
        } else {
            self.bad_epochs += 1;
        }

        if self.cooldown_left > 0 {
            self.cooldown_left -= 1;
            self.bad_epochs = 0;
        }

        if self.bad_epochs > self.patience {
            let old = optimizer.learning_rate();
            let new = (old * self.factor).max(self.min_lr);
            if old - new > 1e-8 {
                log::info!("reducing learning rate {old:.3e} -> {new:.3e}");
                optimizer.set_learning_rate(new);
            }
            self.cooldown_left = self.cooldown;
            self.bad_epochs = 0;
        }
    }

    fn is_plateau(&self) -> bool {
        true
    }
}
