pub mod config;
pub mod epoch_stats;
pub mod runner;

pub use config::RunnerConfig;
pub use epoch_stats::EpochStats;
pub use runner::{AttachOptions, Dump, Evaluation, ModelRunner};
