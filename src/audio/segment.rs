//! Segmentation and crossfaded overlap-add reconstruction
//!
//! A long buffer is cut into windows of nominal length `unit` that overlap by
//! a fraction `overlap`, inferred independently, and stitched back together
//! with a linear crossfade over the shared region. Segmentation and merge must
//! be called with the same overlap or the reconstruction misaligns.

use anyhow::{ensure, Result};

/// Stride between segment starts: `ceil(unit * (1 - overlap))`.
pub fn segment_step(unit: usize, overlap: f64) -> usize {
    (unit as f64 * (1.0 - overlap)).ceil() as usize
}

/// Split a buffer into overlapping windows of nominal length `unit`.
///
/// Segment `i` covers `[i*step, i*step + unit)` clipped to the buffer, so
/// every segment has length `unit` except possibly the last. The number of
/// segments is `ceil(len / step)`.
pub fn segment(input: &[f32], unit: usize, overlap: f64) -> Vec<Vec<f32>> {
    if input.is_empty() || unit == 0 {
        return Vec::new();
    }
    let step = segment_step(unit, overlap).max(1);
    let num_segments = input.len().div_ceil(step);

    (0..num_segments)
        .map(|i| {
            let start = i * step;
            let end = (start + unit).min(input.len());
            input[start..end].to_vec()
        })
        .collect()
}

/// Reassemble per-segment buffers into one continuous buffer.
///
/// The first `ceil(seg0.len * (1 - overlap))` samples of each segment advance
/// the output; the remaining `overlapLen` samples of the previous segment are
/// crossfaded against the head of the next one with linear weights that sum
/// to unity. Writes past either the output or the segment are skipped, since
/// the last segment is typically shorter. A single segment is returned as is.
pub fn merge_segments(segments: &[Vec<f32>], overlap: f64) -> Vec<f32> {
    match segments {
        [] => return Vec::new(),
        [only] => return only.clone(),
        _ => {}
    }

    let unit = segments[0].len();
    let shorter = (unit as f64 * (1.0 - overlap)).ceil() as usize;
    let overlap_len = unit - shorter;
    let mut result = vec![0.0_f32; shorter * segments.len()];

    // First segment is copied whole; its tail seeds the first crossfade.
    for (i, &s) in segments[0].iter().enumerate() {
        if i < result.len() {
            result[i] = s;
        }
    }

    let mut resultp = shorter;
    for seg in &segments[1..] {
        for (k, &s) in seg.iter().enumerate() {
            let i = resultp + k;
            if i >= result.len() {
                break;
            }
            if k < overlap_len && overlap_len > 0 {
                let ratio = k as f32 / overlap_len as f32;
                result[i] = result[i] * (1.0 - ratio) + s * ratio;
            } else {
                result[i] = s;
            }
        }
        resultp += shorter;
    }

    result
}

/// Elementwise blend of two equal-length buffers (arithmetic mean).
pub fn blend(former: &[f32], next: &[f32]) -> Result<Vec<f32>> {
    ensure!(
        former.len() == next.len(),
        "Blend inputs must have the same length (got {} and {})",
        former.len(),
        next.len()
    );
    Ok(former
        .iter()
        .zip(next.iter())
        .map(|(a, b)| 0.5 * (a + b))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32).collect()
    }

    #[test]
    fn test_step_formula() {
        assert_eq!(segment_step(100, 0.1), 90);
        assert_eq!(segment_step(480000, 0.1), 432000);
        // Ceiling, not floor
        assert_eq!(segment_step(95, 0.1), 86);
    }

    #[test]
    fn test_segment_count_and_lengths() {
        let buf = ramp(1000);
        let unit = 300;
        let overlap = 0.1;
        let step = segment_step(unit, overlap); // 270
        let segs = segment(&buf, unit, overlap);

        assert_eq!(segs.len(), (1000 + step - 1) / step);
        for seg in &segs[..segs.len() - 1] {
            assert_eq!(seg.len(), unit);
        }
        let last = segs.last().unwrap();
        assert!(last.len() <= unit);
        assert!(!last.is_empty());
    }

    #[test]
    fn test_segment_offsets() {
        let buf = ramp(1000);
        let step = segment_step(300, 0.1);
        let segs = segment(&buf, 300, 0.1);
        for (i, seg) in segs.iter().enumerate() {
            assert_eq!(seg[0], (i * step) as f32);
        }
    }

    #[test]
    fn test_single_segment_merge_is_identity() {
        let buf = ramp(48000);
        let segs = segment(&buf, 480000, 0.1);
        assert_eq!(segs.len(), 1);
        let merged = merge_segments(&segs, 0.1);
        assert_eq!(merged, buf);
    }

    #[test]
    fn test_ramp_round_trip() {
        let buf = ramp(2000);
        let unit = 500;
        let overlap = 0.1;
        let segs = segment(&buf, unit, overlap);
        assert!(segs.len() > 1);
        let merged = merge_segments(&segs, overlap);

        // Unmodified segments must reconstruct the original values; the
        // crossfade blends identical samples so even boundaries agree.
        for i in 0..buf.len().min(merged.len()) {
            assert!(
                (merged[i] - buf[i]).abs() < 1e-3,
                "sample {} diverged: {} vs {}",
                i,
                merged[i],
                buf[i]
            );
        }
    }

    #[test]
    fn test_crossfade_weights_sum_to_unity() {
        // Two constant segments of different value: the crossfade region must
        // move monotonically from the first value to the second.
        let segs = vec![vec![1.0_f32; 100], vec![3.0_f32; 100]];
        let merged = merge_segments(&segs, 0.1);
        let shorter = 90;
        let overlap_len = 10;

        let fade = &merged[shorter..shorter + overlap_len];
        for w in fade.windows(2) {
            assert!(w[1] >= w[0] - 1e-6);
        }
        assert!(fade[0] >= 1.0 - 1e-6 && fade[0] <= 1.0 + 0.3);
        assert!((merged[shorter + overlap_len] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_merge_output_length() {
        let segs = vec![vec![0.0_f32; 100], vec![0.0; 100], vec![0.0; 40]];
        let merged = merge_segments(&segs, 0.1);
        assert_eq!(merged.len(), 90 * 3);
    }

    #[test]
    fn test_blend_is_mean() {
        let a = vec![1.0_f32, 2.0, 3.0];
        let b = vec![3.0_f32, 2.0, 1.0];
        let out = blend(&a, &b).unwrap();
        assert_eq!(out, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_blend_length_mismatch() {
        let err = blend(&[0.0; 3], &[0.0; 4]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('4'));
    }
}
