use serde::{Deserialize, Serialize};

use crate::network::model::ModelState;

/// A model snapshot: its description and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    pub description: String,
    pub state: ModelState,
}

/// One periodic training checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: usize,
    #[serde(with = "crate::math::nullable")]
    pub loss: f64,
    pub state: ModelState,
}
