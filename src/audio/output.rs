//! Audio output

use anyhow::Result;
use std::path::Path;

/// WAV writer that converts to a playback rate before encoding
pub struct AudioOutput;

impl AudioOutput {
    /// Save samples produced at `source_sr` as a 16-bit mono WAV at `target_sr`
    pub fn save<P: AsRef<Path>>(
        samples: &[f32],
        path: P,
        target_sr: u32,
        source_sr: u32,
    ) -> Result<()> {
        let playback = if source_sr != target_sr {
            super::Resampler::resample(samples, source_sr, target_sr)?
        } else {
            samples.to_vec()
        };

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: target_sr,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
        for &sample in &playback {
            let scaled = (sample * 32767.0).clamp(-32767.0, 32767.0) as i16;
            writer.write_sample(scaled)?;
        }
        writer.finalize()?;
        Ok(())
    }
}
