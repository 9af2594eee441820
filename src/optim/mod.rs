pub mod adam;
pub mod optimizer;
pub mod scheduler;
pub mod sgd;

pub use adam::Adam;
pub use optimizer::{Optimizer, OptimizerKind};
pub use scheduler::{LrScheduler, SchedulerKind};
pub use sgd::Sgd;
