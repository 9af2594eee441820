use std::path::PathBuf;

use thiserror::Error;

/// The result type used across the runner.
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Every failure the runner can report.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// `fit`, `predict` or `dump` was called before `attach`.
    #[error("no model attached; call `attach` before fit/predict")]
    NoModel,

    /// Input data could not be turned into a matrix.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        got: String,
    },

    /// An operation was called out of order (e.g. backward before forward).
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("unknown device `{0}`, expected `cpu` or `gpu`")]
    UnknownDevice(String),

    #[error("checkpoint not found: {}", .0.display())]
    CheckpointNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RunnerError {
    pub(crate) fn shape(what: &'static str, expected: impl ToString, got: impl ToString) -> Self {
        RunnerError::ShapeMismatch {
            what,
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
