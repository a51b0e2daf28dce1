//! # Revoice - RVC Voice Conversion in Rust
//!
//! A real-time-oriented implementation of RVC (Retrieval-based Voice
//! Conversion) inference: it slices a mono waveform into bounded overlapping
//! segments, derives a pitch contour and acoustic conditioning for each one,
//! drives a pretrained voice-conversion model through ONNX Runtime, and
//! stitches the per-segment outputs back into a continuous waveform with a
//! crossfaded overlap-add.
//!
//! ## Features
//!
//! - Segmented inference that hides the model's context-length limit
//! - Autocorrelation pitch estimation with semitone transpose
//! - CPU / CUDA / DirectML execution via ONNX Runtime
//! - Seedable latent-noise generation for reproducible output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use revoice::{RvcPipeline, PipelineConfig, AcfPitchEstimator};
//!
//! let config = PipelineConfig::load("rvc.yaml")?;
//! let mut pipeline = RvcPipeline::from_config(&config)?;
//! let f0 = AcfPitchEstimator::new(16000);
//! let samples = revoice::audio::AudioLoader::load("input.wav", config.sample_rate)?.0;
//! let converted = pipeline.convert(&samples, 0, &f0, 0)?;
//! ```

#![warn(missing_docs)]
#![allow(rustdoc::missing_crate_level_docs)]

pub mod audio;
pub mod config;
pub mod inference;
pub mod models;
pub mod pitch;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use inference::{Conditioning, ConditioningBuilder, RvcPipeline, SegmentTiming};
pub use models::{ExecutionBackend, FeatureExtractor, VoiceConverter};
pub use pitch::{AcfPitchEstimator, PitchEstimator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sample rate the feature extractor and pitch estimator operate at (16 kHz)
pub const MODEL_INPUT_SAMPLE_RATE: u32 = 16000;

/// Nominal segment length in seconds for whole-file inference
pub const SEGMENT_SECONDS: usize = 10;

/// Overlap fraction shared by segmentation and merge
pub const SEGMENT_OVERLAP: f64 = 0.1;

/// Hard upper bound on single-segment duration, in seconds
pub const MAX_SEGMENT_SECONDS: f32 = 30.0;
