use serde::{Deserialize, Serialize};

/// Statistics recorded by `ModelRunner::fit` for each completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Loss of the full-batch forward pass, before this epoch's update.
    pub loss: f64,
    /// Learning rate the optimizer stepped with.
    pub learning_rate: f64,
    pub elapsed_ms: u64,
}
