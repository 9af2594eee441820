use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checkpoint::checker::{read_json, write_json};
use crate::device::Device;
use crate::error::Result;

/// Where run artifacts go when no `work_dir` is configured.
pub const DEFAULT_WORK_DIR: &str = "runs";

/// Runner settings.
///
/// Missing fields take their defaults when loaded from JSON, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub epochs: usize,
    pub device: Device,
    /// Save a checkpoint every N epochs; 0 disables periodic checkpoints.
    pub check_step: usize,
    /// Log the loss every N epochs; 0 disables.
    pub log_step: usize,
    pub work_dir: Option<PathBuf>,
    /// Log the runner environment on construction.
    pub verbose: bool,
    /// Seeds weight initialisation.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            epochs: 2000,
            device: Device::Cpu,
            check_step: 100,
            log_step: 0,
            work_dir: None,
            verbose: true,
            seed: None,
        }
    }
}

impl RunnerConfig {
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn check_step(mut self, check_step: usize) -> Self {
        self.check_step = check_step;
        self
    }

    pub fn log_step(mut self, log_step: usize) -> Self {
        self.log_step = log_step;
        self
    }

    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured work dir, or `runs/`.
    pub fn resolved_work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR))
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), self)
    }

    /// Deserializes a config from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<RunnerConfig> {
        read_json(path.as_ref())
    }
}
