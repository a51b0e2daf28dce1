//! Voice-conversion pipeline
//!
//! Drives the per-segment loop: resample to 16 kHz, estimate pitch, build
//! conditioning, invoke the model, trim and denormalize, then reassemble the
//! per-segment outputs with a crossfaded overlap-add. Segmenting with overlap
//! and merging with the same overlap makes the model's bounded context length
//! invisible in the output.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::audio::{merge_segments, segment, Resampler};
use crate::config::PipelineConfig;
use crate::inference::ConditioningBuilder;
use crate::models::{
    FeatureExtractor, OnnxFeatureExtractor, OnnxVoiceConverter, VoiceConverter,
};
use crate::pitch::PitchEstimator;
use crate::{MAX_SEGMENT_SECONDS, MODEL_INPUT_SAMPLE_RATE, SEGMENT_OVERLAP, SEGMENT_SECONDS};

/// Wall-clock report for one processed segment
#[derive(Debug, Clone)]
pub struct SegmentTiming {
    /// Zero-based segment index
    pub index: usize,
    /// Total number of segments in the run
    pub total: usize,
    /// Processing time for this segment
    pub elapsed: Duration,
    /// Real-time duration of the segment's audio, in seconds
    pub audio_seconds: f32,
}

impl SegmentTiming {
    /// Whether the segment was processed faster than it plays back
    pub fn realtime(&self) -> bool {
        self.elapsed.as_secs_f32() < self.audio_seconds
    }
}

/// Segmented voice-conversion orchestrator.
///
/// Owns the feature-extraction and model capabilities for one run and shares
/// them read-only across all segment calls. The latent-noise generator is
/// owned here so a seeded pipeline produces identical output for identical
/// input.
pub struct RvcPipeline<F: FeatureExtractor, M: VoiceConverter> {
    extractor: F,
    model: M,
    sample_rate: u32,
    hop_size: usize,
    unit_seconds: usize,
    overlap: f64,
    builder: ConditioningBuilder,
    rng: StdRng,
    timings: Vec<SegmentTiming>,
}

impl RvcPipeline<OnnxFeatureExtractor, OnnxVoiceConverter> {
    /// Build an ONNX-backed pipeline from a configuration file
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let extractor = OnnxFeatureExtractor::load(&config.feature_extractor, config.backend)?;
        let model = OnnxVoiceConverter::load(&config.model, config.backend)?;
        let mut pipeline = Self::new(extractor, model, config.sample_rate, config.hop_size);
        pipeline.unit_seconds = config.unit_seconds;
        pipeline.overlap = config.overlap;
        if let Some(seed) = config.latent_seed {
            pipeline.rng = StdRng::seed_from_u64(seed);
        }
        Ok(pipeline)
    }
}

impl<F: FeatureExtractor, M: VoiceConverter> RvcPipeline<F, M> {
    /// Create a pipeline around existing capabilities.
    ///
    /// `sample_rate` is the model's native output rate; `hop_size` is the
    /// synthesis hop of the pretrained export.
    pub fn new(extractor: F, model: M, sample_rate: u32, hop_size: usize) -> Self {
        Self {
            extractor,
            model,
            sample_rate,
            hop_size,
            unit_seconds: SEGMENT_SECONDS,
            overlap: SEGMENT_OVERLAP,
            builder: ConditioningBuilder::new(),
            rng: StdRng::from_entropy(),
            timings: Vec::new(),
        }
    }

    /// Seed the latent-noise generator for reproducible output
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The model's native sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Timing reports from the most recent [`convert`](Self::convert) run
    pub fn timings(&self) -> &[SegmentTiming] {
        &self.timings
    }

    /// Convert a whole buffer at the model's sample rate.
    ///
    /// The buffer is cut into overlapping segments of `unit_seconds`, each
    /// segment is inferred independently, and the outputs are merged with the
    /// same overlap. Per-segment wall-clock time is recorded and classified
    /// against the segment's real-time duration.
    pub fn convert(
        &mut self,
        samples: &[f32],
        speaker: i64,
        pitch: &dyn PitchEstimator,
        transpose_key: i32,
    ) -> Result<Vec<f32>> {
        self.timings.clear();
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let unit = self.sample_rate as usize * self.unit_seconds;
        let overlap = self.overlap;
        let mut segments = segment(samples, unit, overlap);
        let total = segments.len();
        debug!(segments = total, unit, overlap, "segmented input");

        for (i, seg) in segments.iter_mut().enumerate() {
            let start = Instant::now();
            let original_len = seg.len();

            let wav16k = Resampler::resample(seg, self.sample_rate, MODEL_INPUT_SAMPLE_RATE)?;
            let mut converted =
                self.convert_segment(&wav16k, speaker, pitch, transpose_key)?;
            converted.resize(original_len, 0.0);
            *seg = converted;

            let timing = SegmentTiming {
                index: i,
                total,
                elapsed: start.elapsed(),
                audio_seconds: original_len as f32 / self.sample_rate as f32,
            };
            info!(
                "Processed segment {}/{} in {:.2}s - {}",
                i + 1,
                total,
                timing.elapsed.as_secs_f32(),
                if timing.realtime() { "realtime" } else { "slow" }
            );
            self.timings.push(timing);
        }

        Ok(merge_segments(&segments, overlap))
    }

    /// Convert a single pre-segmented 16 kHz buffer.
    ///
    /// Fails fatally for input longer than 30 seconds; callers must segment
    /// first. The output is at the model's native sample rate, denormalized
    /// by the input's dynamic range and padded by `2 * hop_size` trailing
    /// samples to compensate for the model's tail truncation.
    pub fn convert_segment(
        &mut self,
        wav16k: &[f32],
        speaker: i64,
        pitch: &dyn PitchEstimator,
        transpose_key: i32,
    ) -> Result<Vec<f32>> {
        let seconds = wav16k.len() as f32 / MODEL_INPUT_SAMPLE_RATE as f32;
        if seconds > MAX_SEGMENT_SECONDS {
            bail!(
                "Input is {:.1}s long; segment waves down to less than {}s before inference",
                seconds,
                MAX_SEGMENT_SECONDS
            );
        }

        let scale = dynamic_range(wav16k);

        let features = self.extractor.extract(wav16k)?;
        let conditioning = self.builder.build(
            &features,
            wav16k,
            pitch,
            speaker,
            transpose_key,
            &mut self.rng,
        )?;
        let pcm = self.model.convert(&conditioning)?;

        let mut out = denormalize(&pcm, scale);
        out.extend(std::iter::repeat(0.0).take(2 * self.hop_size));
        Ok(out)
    }
}

/// Peak-to-peak amplitude of a buffer
fn dynamic_range(samples: &[f32]) -> f32 {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &s in samples {
        min = min.min(s);
        max = max.max(s);
    }
    if samples.is_empty() {
        0.0
    } else {
        max - min
    }
}

/// Rescale model PCM by the source segment's dynamic range.
///
/// A zero-range output (constant PCM) short-circuits to silence instead of
/// dividing by zero.
fn denormalize(pcm: &[i16], scale: f32) -> Vec<f32> {
    let min = pcm.iter().copied().min().unwrap_or(0);
    let max = pcm.iter().copied().max().unwrap_or(0);
    let range = (max as f32) - (min as f32);
    if range == 0.0 {
        return vec![0.0; pcm.len()];
    }
    pcm.iter().map(|&s| s as f32 * scale / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Conditioning;
    use crate::models::FEATURE_CHANNELS;
    use crate::pitch::AcfPitchEstimator;
    use ndarray::Array3;

    /// Fixed-hop stand-in for the ContentVec session
    struct StubExtractor;

    impl FeatureExtractor for StubExtractor {
        fn extract(&self, wav16k: &[f32]) -> Result<Array3<f32>> {
            let frames = (wav16k.len() / 320).max(1);
            Ok(Array3::zeros((1, FEATURE_CHANNELS, frames)))
        }
    }

    /// Emits a constant tone scaled to the conditioning length
    struct StubModel {
        samples_per_frame: usize,
    }

    impl VoiceConverter for StubModel {
        fn convert(&self, conditioning: &Conditioning) -> Result<Vec<i16>> {
            let len = conditioning.frames() * self.samples_per_frame;
            Ok((0..len).map(|i| if i % 2 == 0 { 8000 } else { -8000 }).collect())
        }
    }

    fn test_pipeline() -> RvcPipeline<StubExtractor, StubModel> {
        RvcPipeline::new(
            StubExtractor,
            StubModel { samples_per_frame: 480 },
            48000,
            512,
        )
        .with_seed(1)
    }

    #[test]
    fn test_segment_over_thirty_seconds_rejected() {
        let mut pipeline = test_pipeline();
        let wav16k = vec![0.1_f32; 16000 * 31];
        let f0 = AcfPitchEstimator::new(16000);
        let err = pipeline
            .convert_segment(&wav16k, 0, &f0, 0)
            .unwrap_err()
            .to_string();
        assert!(err.contains("segment"), "unexpected message: {}", err);
    }

    #[test]
    fn test_segment_output_padded_by_two_hops() {
        let mut pipeline = test_pipeline();
        let wav16k: Vec<f32> = (0..16000)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16000.0).sin())
            .collect();
        let f0 = AcfPitchEstimator::new(16000);
        let out = pipeline.convert_segment(&wav16k, 0, &f0, 0).unwrap();

        let frames = (16000 / 320) * 2;
        assert_eq!(out.len(), frames * 480 + 2 * 512);
        // Tail padding is silent
        assert!(out[out.len() - 2 * 512..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_denormalize_zero_range() {
        assert_eq!(denormalize(&[5, 5, 5], 1.0), vec![0.0, 0.0, 0.0]);
        assert!(denormalize(&[], 1.0).is_empty());
    }

    #[test]
    fn test_denormalize_scales_by_source_range() {
        let out = denormalize(&[-100, 100], 0.5);
        assert!((out[0] + 0.25).abs() < 1e-6);
        assert!((out[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_silent_input_denormalizes_to_silence() {
        let mut pipeline = test_pipeline();
        let f0 = AcfPitchEstimator::new(16000);
        // Zero dynamic range in: the stub tone must come out as silence.
        let out = pipeline.convert_segment(&vec![0.0; 8000], 0, &f0, 0).unwrap();
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_whole_file_timing_reports() {
        let mut pipeline = test_pipeline();
        let f0 = AcfPitchEstimator::new(16000);
        // 12s at 48 kHz with 10s units: two segments
        let samples = vec![0.0_f32; 48000 * 12];
        let out = pipeline.convert(&samples, 0, &f0, 0).unwrap();

        assert_eq!(pipeline.timings().len(), 2);
        assert_eq!(pipeline.timings()[0].total, 2);
        assert!(pipeline.timings()[0].audio_seconds > 9.9);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let mut pipeline = test_pipeline();
        let f0 = AcfPitchEstimator::new(16000);
        assert!(pipeline.convert(&[], 0, &f0, 0).unwrap().is_empty());
    }
}
