use std::f64::consts::PI;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;

/// Weight initialisation applied to every linear layer when a model is attached.
///
/// Only weights are touched; biases keep their current values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Init {
    /// Uniform on `(-scale, scale)`.
    Uniform { scale: f64 },
    /// Normal with mean 0 and standard deviation `std`.
    Normal { std: f64 },
    /// He: N(0, sqrt(2 / fan_in)). Suits ReLU-family layers.
    He,
    /// Xavier (Glorot): N(0, sqrt(1 / fan_in)). Suits Sigmoid/Tanh/Identity layers.
    Xavier,
}

impl Default for Init {
    fn default() -> Self {
        Init::Uniform { scale: 0.1 }
    }
}

impl Init {
    /// Overwrites `weights` in place. Rows of `weights` are the fan-in.
    pub fn apply(&self, weights: &mut Matrix, rng: &mut dyn RngCore) {
        let fan_in = weights.rows.max(1) as f64;
        for row in weights.data.iter_mut() {
            for w in row.iter_mut() {
                *w = match *self {
                    Init::Uniform { scale } => (rng.gen::<f64>() * 2.0 - 1.0) * scale,
                    Init::Normal { std } => standard_normal(rng) * std,
                    Init::He => standard_normal(rng) * (2.0 / fan_in).sqrt(),
                    Init::Xavier => standard_normal(rng) * (1.0 / fan_in).sqrt(),
                };
            }
        }
    }
}

/// Samples N(0, 1) with the Box-Muller transform.
fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    // 1 - U[0, 1) lies in (0, 1], keeping ln() finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_stays_within_scale() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut w = Matrix::zeros(20, 20);
        Init::Uniform { scale: 0.1 }.apply(&mut w, &mut rng);
        assert!(w.ravel().iter().all(|x| x.abs() < 0.1));
        assert!(w.ravel().iter().any(|x| *x != 0.0));
    }

    #[test]
    fn he_variance_tracks_fan_in() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut w = Matrix::zeros(50, 200);
        Init::He.apply(&mut w, &mut rng);
        let values = w.ravel();
        let var = values.iter().map(|x| x * x).sum::<f64>() / values.len() as f64;
        assert!((var - 2.0 / 50.0).abs() < 0.005, "variance {var}");
    }

    #[test]
    fn same_seed_same_weights() {
        let mut a = Matrix::zeros(3, 4);
        let mut b = Matrix::zeros(3, 4);
        Init::Xavier.apply(&mut a, &mut StdRng::seed_from_u64(1));
        Init::Xavier.apply(&mut b, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
