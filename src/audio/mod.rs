//! Audio processing modules
//!
//! - WAV loading with mixdown and resample-on-load
//! - Sample rate conversion (model rate, 16 kHz analysis rate, playback rate)
//! - Segmentation and crossfaded overlap-add reconstruction
//! - WAV output at a chosen playback rate

mod loader;
mod output;
mod resampler;
mod segment;

pub use loader::AudioLoader;
pub use output::AudioOutput;
pub use resampler::Resampler;
pub use segment::{blend, merge_segments, segment, segment_step};
