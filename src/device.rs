use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Where the runner asks to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Gpu,
}

impl Device {
    /// Only the CPU backend is compiled in.
    pub fn is_available(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    /// The device that will actually run; an unavailable GPU falls back to CPU.
    pub fn resolve(self) -> Device {
        if self.is_available() {
            return self;
        }
        log::warn!("no GPU backend available, falling back to CPU");
        Device::Cpu
    }
}

impl FromStr for Device {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "gpu" | "cuda" => Ok(Device::Gpu),
            _ => Err(RunnerError::UnknownDevice(s.to_string())),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "CPU"),
            Device::Gpu => write!(f, "GPU"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!(" gpu ".parse::<Device>().unwrap(), Device::Gpu);
        assert!(matches!("tpu".parse::<Device>(), Err(RunnerError::UnknownDevice(_))));
    }

    #[test]
    fn gpu_falls_back_to_cpu() {
        assert_eq!(Device::Gpu.resolve(), Device::Cpu);
        assert_eq!(Device::Cpu.resolve(), Device::Cpu);
    }
}
