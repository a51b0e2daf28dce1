//! Pipeline configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::ExecutionBackend;

fn default_sample_rate() -> u32 {
    40000
}

fn default_hop_size() -> usize {
    512
}

fn default_unit_seconds() -> usize {
    crate::SEGMENT_SECONDS
}

fn default_overlap() -> f64 {
    crate::SEGMENT_OVERLAP
}

/// Configuration for an ONNX-backed conversion pipeline.
///
/// Loaded from YAML; everything except the two model paths has a default
/// matching the common pretrained RVC exports.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Path to the voice-conversion model export
    pub model: PathBuf,
    /// Path to the ContentVec feature-extractor export
    pub feature_extractor: PathBuf,
    /// Native sample rate of the model export
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Synthesis hop size of the model export
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    /// Execution backend for both sessions
    #[serde(default)]
    pub backend: ExecutionBackend,
    /// Nominal segment length for whole-file inference, in seconds
    #[serde(default = "default_unit_seconds")]
    pub unit_seconds: usize,
    /// Overlap fraction shared by segmentation and merge
    #[serde(default = "default_overlap")]
    pub overlap: f64,
    /// Seed for the latent-noise generator; unset means entropy-seeded
    #[serde(default)]
    pub latent_seed: Option<u64>,
}

impl PipelineConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {:?}", path))
    }
}
