use std::fmt;

use rand::RngCore;

use crate::activation::activation::ActivationFunction;
use crate::error::{Result, RunnerError};
use crate::layers::dense::Dense;
use crate::layers::parameter::Parameter;
use crate::math::matrix::Matrix;
use crate::network::init::Init;
use crate::network::model::{Model, ModelState};

/// A sequential stack of dense layers.
#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<Dense>,
}

impl Network {
    /// Builds a network from `(size, input_size, activation)` tuples.
    ///
    /// Each layer's `input_size` must equal the previous layer's `size`.
    pub fn new(layer_specs: Vec<(usize, usize, ActivationFunction)>) -> Result<Network> {
        if layer_specs.is_empty() {
            return Err(RunnerError::InvalidInput("a network needs at least one layer".into()));
        }
        for pair in layer_specs.windows(2) {
            let (prev_size, _, _) = pair[0];
            let (_, input_size, _) = pair[1];
            if prev_size != input_size {
                return Err(RunnerError::shape("layer stacking", prev_size, input_size));
            }
        }
        let layers = layer_specs
            .into_iter()
            .map(|(size, input_size, activation)| Dense::new(size, input_size, activation))
            .collect();
        Ok(Network { layers })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }
}

impl Model for Network {
    fn forward(&mut self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &mut self.layers {
            current = layer.forward(&current)?;
        }
        Ok(current)
    }

    fn backward(&mut self, grad_output: &Matrix) -> Result<()> {
        let mut delta = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            delta = layer.backward(&delta)?;
        }
        Ok(())
    }

    fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        self.layers
            .iter_mut()
            .flat_map(|l| [&mut l.weights, &mut l.biases])
            .collect()
    }

    fn init_weights(&mut self, init: &Init, rng: &mut dyn RngCore) {
        for layer in &mut self.layers {
            log::debug!("init weight -> {layer}");
            init.apply(&mut layer.weights.value, rng);
        }
    }

    fn state(&self) -> ModelState {
        let mut state = ModelState::default();
        for (i, layer) in self.layers.iter().enumerate() {
            state.insert(format!("{i}.weight"), layer.weights.value.clone());
            state.insert(format!("{i}.bias"), layer.biases.value.clone());
        }
        state
    }

    fn load_state(&mut self, state: &ModelState) -> Result<()> {
        if state.len() != self.layers.len() * 2 {
            return Err(RunnerError::shape(
                "model state entries",
                self.layers.len() * 2,
                state.len(),
            ));
        }
        // Validate everything before mutating so a bad state leaves the model untouched.
        let mut staged = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            let weight = lookup(state, &format!("{i}.weight"), &layer.weights)?;
            let bias = lookup(state, &format!("{i}.bias"), &layer.biases)?;
            staged.push((weight.clone(), bias.clone()));
        }
        for (layer, (weight, bias)) in self.layers.iter_mut().zip(staged) {
            layer.weights.value = weight;
            layer.biases.value = bias;
            layer.weights.zero_grad();
            layer.biases.zero_grad();
        }
        Ok(())
    }
}

fn lookup<'a>(state: &'a ModelState, name: &str, current: &Parameter) -> Result<&'a Matrix> {
    let value = state
        .get(name)
        .ok_or_else(|| RunnerError::InvalidInput(format!("model state is missing `{name}`")))?;
    if value.shape() != current.shape() {
        return Err(RunnerError::shape(
            "model state tensor",
            format!("{name} {:?}", current.shape()),
            format!("{:?}", value.shape()),
        ));
    }
    Ok(value)
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Network(")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "  ({i}): {layer}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn net() -> Network {
        Network::new(vec![
            (3, 2, ActivationFunction::Tanh),
            (1, 3, ActivationFunction::Identity),
        ])
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_stacking() {
        let err = Network::new(vec![
            (3, 2, ActivationFunction::ReLU),
            (1, 4, ActivationFunction::Identity),
        ])
        .unwrap_err();
        assert!(matches!(err, RunnerError::ShapeMismatch { .. }));
        assert!(Network::new(vec![]).is_err());
    }

    #[test]
    fn sizes_come_from_the_outer_layers() {
        let n = net();
        assert_eq!((n.input_size(), n.output_size()), (2, 1));
    }

    #[test]
    fn display_lists_layers() {
        let text = net().to_string();
        assert!(text.starts_with("Network("));
        assert!(text.contains("(0): Dense(in_features=2, out_features=3, activation=Tanh)"));
        assert!(text.contains("(1): Dense(in_features=3, out_features=1, activation=Identity)"));
    }

    #[test]
    fn state_round_trips_and_validates() {
        let mut a = net();
        a.init_weights(&Init::Xavier, &mut StdRng::seed_from_u64(3));
        let state = a.state();
        assert_eq!(state.len(), 4);

        let mut b = net();
        b.load_state(&state).unwrap();
        assert_eq!(b.state(), state);

        let mut bad = state.clone();
        bad.insert("0.weight", Matrix::zeros(5, 5));
        assert!(b.load_state(&bad).is_err());
        assert_eq!(b.state(), state);
    }

    #[test]
    fn init_leaves_biases_alone() {
        let mut n = net();
        n.layers[0].biases.value = Matrix::filled(1, 3, 0.5);
        n.init_weights(&Init::Uniform { scale: 0.1 }, &mut StdRng::seed_from_u64(9));
        assert_eq!(n.layers[0].biases.value, Matrix::filled(1, 3, 0.5));
    }

    #[test]
    fn forward_produces_one_row_per_sample() {
        let mut n = net();
        n.init_weights(&Init::He, &mut StdRng::seed_from_u64(5));
        let x = Matrix::from_rows(vec![vec![0.1, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]]).unwrap();
        assert_eq!(n.forward(&x).unwrap().shape(), (3, 1));
    }
}
