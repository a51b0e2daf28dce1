//! Execution backend selection

use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, DirectMLExecutionProvider,
    ExecutionProviderDispatch,
};
use serde::Deserialize;

/// Runtime backend the ONNX sessions are built against.
///
/// Resolved once when a session is constructed; per-call code never branches
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionBackend {
    /// Portable CPU execution
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration
    Cuda,
    /// DirectML acceleration (Windows)
    DirectMl,
}

impl ExecutionBackend {
    /// The ort execution provider this backend registers
    pub fn provider(self) -> ExecutionProviderDispatch {
        match self {
            ExecutionBackend::Cpu => CPUExecutionProvider::default().build(),
            ExecutionBackend::Cuda => CUDAExecutionProvider::default().build(),
            ExecutionBackend::DirectMl => DirectMLExecutionProvider::default().build(),
        }
    }
}

impl std::str::FromStr for ExecutionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(ExecutionBackend::Cpu),
            "cuda" => Ok(ExecutionBackend::Cuda),
            "directml" | "dml" => Ok(ExecutionBackend::DirectMl),
            other => Err(anyhow::anyhow!("Unknown execution backend: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("cpu".parse::<ExecutionBackend>().unwrap(), ExecutionBackend::Cpu);
        assert_eq!("CUDA".parse::<ExecutionBackend>().unwrap(), ExecutionBackend::Cuda);
        assert_eq!("dml".parse::<ExecutionBackend>().unwrap(), ExecutionBackend::DirectMl);
        assert!("npu".parse::<ExecutionBackend>().is_err());
    }

    #[test]
    fn test_default_is_cpu() {
        assert_eq!(ExecutionBackend::default(), ExecutionBackend::Cpu);
    }
}
