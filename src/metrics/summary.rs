use serde::{Deserialize, Serialize};

/// Evaluation report written to `summary.json` by `predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The model's description.
    pub layers: String,
    pub name: String,
    #[serde(with = "crate::math::nullable")]
    pub mae: f64,
    #[serde(with = "crate::math::nullable")]
    pub r2: f64,
    /// NaN when either input is constant; stored as `null`.
    #[serde(with = "crate::math::nullable")]
    pub pearsonr: f64,
    #[serde(rename = "p-value", with = "crate::math::nullable")]
    pub p_value: f64,
}
