//! Audio file loading

use anyhow::{ensure, Context, Result};
use std::path::Path;

/// WAV loader with mixdown and resample-on-load
pub struct AudioLoader;

impl AudioLoader {
    /// Load a WAV file and return mono samples at the requested rate.
    ///
    /// Multi-channel input is averaged down to mono; integer PCM is scaled
    /// into `[-1, 1]`. The returned rate always equals `target_sr`.
    pub fn load<P: AsRef<Path>>(path: P, target_sr: u32) -> Result<(Vec<f32>, u32)> {
        let path = path.as_ref();
        ensure!(
            path.extension().map_or(false, |e| e == "wav"),
            "Unsupported audio format: {:?}",
            path
        );

        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {:?}", path))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        let source_sr = spec.sample_rate;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.into_samples::<f32>().filter_map(Result::ok).collect()
            }
            hound::SampleFormat::Int => {
                let full_scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .filter_map(Result::ok)
                    .map(|s| s as f32 / full_scale)
                    .collect()
            }
        };

        let mono: Vec<f32> = if channels > 1 {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        } else {
            interleaved
        };

        let samples = if source_sr != target_sr {
            super::Resampler::resample(&mono, source_sr, target_sr)?
        } else {
            mono
        };
        Ok((samples, target_sr))
    }
}
