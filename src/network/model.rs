use std::collections::BTreeMap;
use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layers::parameter::Parameter;
use crate::math::matrix::Matrix;
use crate::network::init::Init;

/// The seam between the runner and a trainable model.
///
/// `Display` is the model's description: it names the model when no name is
/// given on attach and is recorded in checkpoints and summaries.
pub trait Model: fmt::Display {
    /// Batch forward pass. Caches whatever `backward` needs.
    fn forward(&mut self, input: &Matrix) -> Result<Matrix>;

    /// Accumulates gradients for ∂L/∂output of the last `forward`.
    fn backward(&mut self, grad_output: &Matrix) -> Result<()>;

    fn parameters_mut(&mut self) -> Vec<&mut Parameter>;

    fn zero_grad(&mut self) {
        for p in self.parameters_mut() {
            p.zero_grad();
        }
    }

    /// Re-initialises the weights of every linear layer.
    fn init_weights(&mut self, init: &Init, rng: &mut dyn RngCore);

    fn state(&self) -> ModelState;

    /// Replaces the parameters with `state`; names and shapes must match.
    fn load_state(&mut self, state: &ModelState) -> Result<()>;
}

/// Named parameter tensors, keyed `"<layer>.weight"` / `"<layer>.bias"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelState(pub BTreeMap<String, Matrix>);

impl ModelState {
    pub fn insert(&mut self, name: impl Into<String>, value: Matrix) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Matrix> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
