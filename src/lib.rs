pub mod activation;
pub mod checkpoint;
pub mod data;
pub mod device;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod metrics;
pub mod network;
pub mod optim;
pub mod runner;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use checkpoint::{Checker, Checkpoint, DataKind, ModelRecord};
pub use data::IntoMatrix;
pub use device::Device;
pub use error::{Result, RunnerError};
pub use layers::{Dense, Parameter};
pub use loss::{Loss, LossType};
pub use math::matrix::Matrix;
pub use metrics::Summary;
pub use network::{Init, Model, ModelState, Network};
pub use optim::{LrScheduler, Optimizer, OptimizerKind, SchedulerKind};
pub use runner::{AttachOptions, Dump, EpochStats, Evaluation, ModelRunner, RunnerConfig};
