//! Audio resampling using rubato

use anyhow::Result;
use rubato::{
    Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

/// Band-limited sinc resampler with a fixed output-length contract
pub struct Resampler;

impl Resampler {
    /// Resample a mono buffer from one sample rate to another.
    ///
    /// The output length is always `round(len * to_sr / from_sr)`; the
    /// interpolator's output is truncated or zero-padded to meet it, so the
    /// same input always yields a buffer of the same size.
    pub fn resample(samples: &[f32], from_sr: u32, to_sr: u32) -> Result<Vec<f32>> {
        if from_sr == to_sr {
            return Ok(samples.to_vec());
        }
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let ratio = to_sr as f64 / from_sr as f64;
        let expected = (samples.len() as f64 * ratio).round() as usize;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let mut resampler = SincFixedIn::<f32>::new(
            ratio,
            2.0,
            params,
            samples.len(),
            1,
        )?;

        let input = vec![samples.to_vec()];
        let output = resampler.process(&input, None)?;
        let mut out = output.into_iter().next().unwrap_or_default();

        // Enforce the length contract regardless of interpolator slack.
        out.resize(expected, 0.0);
        Ok(out)
    }

    /// Downsample to the 16 kHz analysis rate used by the feature extractor
    pub fn to_16k(samples: &[f32], from_sr: u32) -> Result<Vec<f32>> {
        Self::resample(samples, from_sr, crate::MODEL_INPUT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_rates_match() {
        let x = vec![0.1_f32, -0.2, 0.3];
        let y = Resampler::resample(&x, 48000, 48000).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn test_output_length_contract() {
        let x = vec![0.0_f32; 48000];
        let y = Resampler::resample(&x, 48000, 16000).unwrap();
        assert_eq!(y.len(), 16000);

        let z = Resampler::resample(&x, 48000, 44100).unwrap();
        assert_eq!(z.len(), 44100);
    }

    #[test]
    fn test_deterministic() {
        let x: Vec<f32> = (0..4800)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 48000.0).sin())
            .collect();
        let a = Resampler::resample(&x, 48000, 16000).unwrap();
        let b = Resampler::resample(&x, 48000, 16000).unwrap();
        assert_eq!(a, b);
    }
}
