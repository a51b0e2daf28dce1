//! Conditioning-tensor construction
//!
//! Turns extracted features, a pitch contour, a speaker id, and latent noise
//! into the bundle the RVC model consumes. The pitch contour is transposed by
//! the requested semitone key, warped onto a mel-like scale, and quantized
//! into the integer classes `[1, 255]` the model was trained on.

use anyhow::{ensure, Result};
use ndarray::Array3;
use rand::Rng;

use crate::models::FEATURE_CHANNELS;
use crate::pitch::PitchEstimator;

/// Lowest calibrated pitch, Hz
pub const F0_MIN: f32 = 50.0;
/// Highest calibrated pitch, Hz
pub const F0_MAX: f32 = 1100.0;
/// Nearest-neighbor duplication factor along the feature time axis
pub const FEATURE_UPSAMPLE: usize = 2;
/// Channel count of the latent-noise tensor
pub const LATENT_CHANNELS: usize = 192;

/// Tensor bundle for one model invocation
pub struct Conditioning {
    /// Upsampled features, `[1, T, 768]`
    pub features: Array3<f32>,
    /// Feature time dimension, as the model's length scalar
    pub feature_len: i64,
    /// Quantized pitch classes in `[1, 255]`, one per time-step
    pub pitch_classes: Vec<i64>,
    /// Pitch contour in Hz after semitone transpose
    pub pitch_hz: Vec<f32>,
    /// Target speaker id
    pub speaker: i64,
    /// Latent noise, `[1, 192, T]`, uniform on `[0, 1)`
    pub latent: Array3<f32>,
}

impl Conditioning {
    /// Shared time dimension of the bundle
    pub fn frames(&self) -> usize {
        self.pitch_hz.len()
    }
}

/// Builds [`Conditioning`] bundles from raw extractor output
pub struct ConditioningBuilder {
    f0_mel_min: f32,
    f0_mel_max: f32,
}

impl ConditioningBuilder {
    /// Builder calibrated to the standard RVC pitch range (50-1100 Hz)
    pub fn new() -> Self {
        Self {
            f0_mel_min: hz_to_mel(F0_MIN),
            f0_mel_max: hz_to_mel(F0_MAX),
        }
    }

    /// Assemble a bundle for one 16 kHz segment.
    ///
    /// `features` is the extractor's channel-major `[1, 768, T]` output; the
    /// random source for the latent tensor is injected so tests can seed it.
    pub fn build<R: Rng>(
        &self,
        features: &Array3<f32>,
        wav16k: &[f32],
        pitch: &dyn PitchEstimator,
        speaker: i64,
        transpose_key: i32,
        rng: &mut R,
    ) -> Result<Conditioning> {
        let (batch, channels, _) = features.dim();
        ensure!(
            batch == 1 && channels == FEATURE_CHANNELS,
            "Expected feature tensor [1, {}, T], got {:?}",
            FEATURE_CHANNELS,
            features.dim()
        );

        let features = upsample_features(features);
        let frames = features.dim().1;

        let shift = 2.0_f32.powf(transpose_key as f32 / 12.0);
        let pitch_hz: Vec<f32> = pitch
            .compute_f0(wav16k, frames)
            .into_iter()
            .map(|f0| f0 * shift)
            .collect();
        let pitch_classes: Vec<i64> = pitch_hz
            .iter()
            .map(|&f0| self.pitch_class(f0))
            .collect();

        let latent = Array3::from_shape_fn((1, LATENT_CHANNELS, frames), |_| rng.gen::<f32>());

        // The model requires one pitch class and one latent column per
        // feature time-step; a mismatch here would fail opaquely inside the
        // runtime, so it is rejected up front.
        ensure!(
            pitch_classes.len() == frames && latent.dim().2 == frames,
            "Conditioning time dimensions disagree: features {}, pitch {}, latent {}",
            frames,
            pitch_classes.len(),
            latent.dim().2
        );

        Ok(Conditioning {
            features,
            feature_len: frames as i64,
            pitch_classes,
            pitch_hz,
            speaker,
            latent,
        })
    }

    /// Map a pitch in Hz onto the integer class range `[1, 255]`.
    ///
    /// Unvoiced (`<= 0` Hz) maps to class 1; the mel value is rescaled
    /// linearly between the 50 Hz and 1100 Hz calibration bounds, clipped at
    /// 255, and rounded to the nearest class.
    pub fn pitch_class(&self, f0: f32) -> i64 {
        let mel = hz_to_mel(f0);
        if mel <= 0.0 {
            return 1;
        }
        let scaled = (mel - self.f0_mel_min) * 254.0 / (self.f0_mel_max - self.f0_mel_min) + 1.0;
        scaled.clamp(1.0, 255.0).round() as i64
    }
}

impl Default for ConditioningBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Perceptual log-frequency warp: `1127 * ln(1 + hz / 700)`
pub fn hz_to_mel(hz: f32) -> f32 {
    1127.0 * (1.0 + hz / 700.0).ln()
}

/// Duplicate each feature time-step and reorder to `[1, T, 768]`.
///
/// Input is the extractor's channel-major `[1, 768, T]`; every column is
/// repeated `FEATURE_UPSAMPLE` times (nearest neighbor) along time.
fn upsample_features(features: &Array3<f32>) -> Array3<f32> {
    let (_, channels, frames) = features.dim();
    Array3::from_shape_fn((1, frames * FEATURE_UPSAMPLE, channels), |(_, t, c)| {
        features[(0, c, t / FEATURE_UPSAMPLE)]
    })
}
