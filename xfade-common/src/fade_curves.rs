//! Fade ramps for crossfading
//!
//! Provides the two primitives the crossfade engine is built on:
//! - `ramp`: linear gain ramp applied in place
//! - `mix_add`: sample-wise addition of one block onto another
//!
//! Both operate on interleaved buffers. The ramp position advances per
//! interleaved sample, so a multi-channel block is ramped as one sequence.

/// Apply a linear gain ramp to `samples` in place.
///
/// Sample `i` of `n` is scaled by `gain_start * (n - i) / n + gain_end * i / n`.
/// The first sample receives exactly `gain_start`; the final gain
/// `gain_end` is approached but only reached by the sample that would
/// follow the block, so consecutive ramps over adjacent blocks join
/// without a step.
///
/// # Arguments
/// * `samples` - Interleaved samples to scale
/// * `gain_start` - Gain at the first sample
/// * `gain_end` - Gain one sample past the end of the block
pub fn ramp(samples: &mut [f32], gain_start: f32, gain_end: f32) {
    let n = samples.len();
    if n == 0 {
        return;
    }

    let len = n as f32;
    for (i, sample) in samples.iter_mut().enumerate() {
        let pos = i as f32;
        *sample *= (gain_start * (len - pos) + gain_end * pos) / len;
    }
}

/// Fade a block out completely (gain 1.0 → 0.0).
pub fn fade_out(samples: &mut [f32]) {
    ramp(samples, 1.0, 0.0);
}

/// Add `src` onto `dst` sample by sample.
///
/// # Panics
/// Panics if the two blocks differ in length. A mismatch means the caller
/// computed its overlap window wrongly; it is never clamped.
pub fn mix_add(dst: &mut [f32], src: &[f32]) {
    assert_eq!(
        dst.len(),
        src.len(),
        "mix_add: destination has {} samples, source has {}",
        dst.len(),
        src.len()
    );

    for (d, s) in dst.iter_mut().zip(src) {
        *d += *s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_ramp_empty_is_noop() {
        let mut samples: Vec<f32> = Vec::new();
        ramp(&mut samples, 1.0, 0.0);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_ramp_linear_gains() {
        let mut samples = vec![1.0; 4];
        ramp(&mut samples, 1.0, 0.0);

        // (n - i) / n for n = 4
        assert!((samples[0] - 1.0).abs() < EPSILON);
        assert!((samples[1] - 0.75).abs() < EPSILON);
        assert!((samples[2] - 0.5).abs() < EPSILON);
        assert!((samples[3] - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_ramp_partial_range() {
        let mut samples = vec![2.0; 2];
        ramp(&mut samples, 0.5, 1.0);

        assert!((samples[0] - 1.0).abs() < EPSILON); // 2.0 * 0.5
        assert!((samples[1] - 1.5).abs() < EPSILON); // 2.0 * 0.75
    }

    #[test]
    fn test_ramp_unity_preserves_samples() {
        let original = vec![0.3, -0.7, 0.9, -0.1, 0.5];
        let mut samples = original.clone();
        ramp(&mut samples, 1.0, 1.0);

        for (a, b) in samples.iter().zip(&original) {
            assert!((a - b).abs() < EPSILON);
        }
    }

    #[test]
    fn test_complementary_ramps_sum_to_original() {
        // Fading a block out and the same block in, then mixing, must
        // reconstruct the block: the two gains always sum to 1.0.
        let original: Vec<f32> = (0..64).map(|i| ((i as f32) * 0.37).sin()).collect();

        let mut outgoing = original.clone();
        let mut incoming = original.clone();
        ramp(&mut outgoing, 1.0, 0.0);
        ramp(&mut incoming, 0.0, 1.0);
        mix_add(&mut outgoing, &incoming);

        for (i, (a, b)) in outgoing.iter().zip(&original).enumerate() {
            assert!((a - b).abs() < 1e-5, "sample {} differs: {} vs {}", i, a, b);
        }
    }

    #[test]
    fn test_fade_out_starts_at_unity() {
        let mut samples = vec![0.8; 10];
        fade_out(&mut samples);

        assert!((samples[0] - 0.8).abs() < EPSILON);
        assert!(samples[9] < samples[8]);
        assert!(samples[9] > 0.0);
    }

    #[test]
    fn test_mix_add() {
        let mut dst = vec![0.1, 0.2, 0.3];
        mix_add(&mut dst, &[0.4, -0.2, 0.0]);

        assert!((dst[0] - 0.5).abs() < EPSILON);
        assert!((dst[1] - 0.0).abs() < EPSILON);
        assert!((dst[2] - 0.3).abs() < EPSILON);
    }

    #[test]
    #[should_panic(expected = "mix_add")]
    fn test_mix_add_length_mismatch_panics() {
        let mut dst = vec![0.0; 4];
        mix_add(&mut dst, &[1.0; 3]);
    }
}
