//! Autocorrelation (ACF) pitch estimation

use super::PitchEstimator;

/// Autocorrelation-based F0 estimator.
///
/// Each analysis window spans 1.5 hops so the autocorrelation has enough lag
/// range to cover one full period of the lowest expected pitch.
pub struct AcfPitchEstimator {
    sample_rate: u32,
}

impl AcfPitchEstimator {
    /// Create an estimator for buffers sampled at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// F0 for a single frame, or 0.0 if the frame has no usable periodicity.
    ///
    /// Lag 0 is the global maximum by construction and is skipped. The search
    /// first advances past the initial strictly-decreasing run starting at
    /// lag 1 (a spurious peak inside that decay would alias the period), then
    /// takes the lag with the largest autocorrelation. A frame whose
    /// autocorrelation never rises again (silence, DC, pure decay) yields no
    /// peak and is reported unvoiced rather than dividing by a degenerate lag.
    fn frame_f0(&self, frame: &[f32]) -> f32 {
        let n = frame.len();
        if n < 3 {
            return 0.0;
        }

        let mut ac = vec![0.0_f32; n];
        for (lag, slot) in ac.iter_mut().enumerate() {
            let mut sum = 0.0;
            for i in 0..n - lag {
                sum += frame[i] * frame[i + lag];
            }
            *slot = sum;
        }

        // Zero-energy frame: nothing to estimate.
        if ac[0] <= f32::EPSILON {
            return 0.0;
        }

        // Walk past the initial decay from lag 1 to the first genuine rise.
        let mut lag = 1;
        while lag + 1 < n && ac[lag + 1] <= ac[lag] {
            lag += 1;
        }
        if lag + 1 >= n {
            // Monotone decay all the way out: no periodic peak.
            return 0.0;
        }

        let mut peak_lag = lag + 1;
        let mut peak_val = ac[peak_lag];
        for l in peak_lag + 1..n {
            if ac[l] > peak_val {
                peak_val = ac[l];
                peak_lag = l;
            }
        }

        if peak_val <= 0.0 {
            return 0.0;
        }

        self.sample_rate as f32 / peak_lag as f32
    }
}

impl PitchEstimator for AcfPitchEstimator {
    fn compute_f0(&self, wav: &[f32], frames: usize) -> Vec<f32> {
        if frames == 0 || wav.is_empty() {
            return vec![0.0; frames];
        }

        let hop = wav.len() / frames;
        if hop == 0 {
            return vec![0.0; frames];
        }
        let window = hop + hop / 2;

        let num_frames = wav.len() / hop;
        let mut f0 = Vec::with_capacity(frames);
        for i in 0..num_frames.min(frames) {
            let start = i * hop;
            let end = (start + window).min(wav.len());
            f0.push(self.frame_f0(&wav[start..end]));
        }

        // Repeat the final estimate so the contour is exactly `frames` long.
        let pad = *f0.last().unwrap_or(&0.0);
        f0.resize(frames, pad);
        f0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_sine_within_five_percent() {
        let rate = 16000;
        let wav = sine(440.0, rate, rate as usize);
        let est = AcfPitchEstimator::new(rate);
        let f0 = est.compute_f0(&wav, 50);

        assert_eq!(f0.len(), 50);
        // Interior frames only; the edges may be under-windowed.
        for &v in &f0[1..49] {
            assert!(
                (v - 440.0).abs() / 440.0 < 0.05,
                "estimate {} too far from 440",
                v
            );
        }
    }

    #[test]
    fn test_low_pitch() {
        let rate = 16000;
        let wav = sine(110.0, rate, rate as usize);
        let est = AcfPitchEstimator::new(rate);
        let f0 = est.compute_f0(&wav, 40);
        for &v in &f0[1..39] {
            assert!((v - 110.0).abs() / 110.0 < 0.05);
        }
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let est = AcfPitchEstimator::new(16000);
        let f0 = est.compute_f0(&vec![0.0; 16000], 50);
        assert_eq!(f0.len(), 50);
        assert!(f0.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dc_is_unvoiced() {
        // Constant signal: autocorrelation decays monotonically, no rise.
        let est = AcfPitchEstimator::new(16000);
        let f0 = est.compute_f0(&vec![0.5; 8000], 25);
        assert!(f0.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_exact_output_length() {
        let est = AcfPitchEstimator::new(16000);
        // Buffer shorter than frames * 2: estimates are padded by repetition.
        let wav = sine(220.0, 16000, 3200);
        let f0 = est.compute_f0(&wav, 100);
        assert_eq!(f0.len(), 100);
    }

    #[test]
    fn test_empty_input() {
        let est = AcfPitchEstimator::new(16000);
        assert_eq!(est.compute_f0(&[], 10), vec![0.0; 10]);
        assert!(est.compute_f0(&[0.0; 100], 0).is_empty());
    }
}
