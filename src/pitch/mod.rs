//! Fundamental-frequency estimation
//!
//! The conditioning pipeline needs one F0 value per conditioning time-step.
//! Estimators implement [`PitchEstimator`] so the orchestrator stays agnostic
//! to the extraction method; 0 Hz denotes an unvoiced frame.

mod acf;

pub use acf::AcfPitchEstimator;

/// Per-frame F0 extraction over a 16 kHz mono buffer
pub trait PitchEstimator {
    /// Compute an F0 contour with exactly `frames` entries, in Hz.
    ///
    /// The hop between analysis frames is derived from the buffer length so
    /// the contour lines up with `frames` conditioning time-steps. Unvoiced
    /// frames are reported as 0.0.
    fn compute_f0(&self, wav: &[f32], frames: usize) -> Vec<f32>;
}
