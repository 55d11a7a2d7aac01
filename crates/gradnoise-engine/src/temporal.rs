//! Temporal frame jitter with overlap-add.
//!
//! The waveform is cut into 10 ms frames. Each frame is moved by its own
//! random shift of at most `10 ms · level` and summed into an output buffer of
//! the same length. Shifted frames are clipped at the buffer edges. Samples
//! after the last full frame are left at zero.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::level::NoiseLevel;
use crate::normalize::{normalize_in_place, peak_normalize};
use crate::waveform::Waveform;

/// Frame length in milliseconds.
pub const FRAME_MS: f64 = 10.0;

/// Maximum shift at full noise, in milliseconds.
pub const MAX_SHIFT_MS: f64 = 10.0;

/// Frame length in samples at `sample_rate`.
pub fn frame_len(sample_rate: u32) -> usize {
    (sample_rate as f64 * FRAME_MS / 1000.0) as usize
}

/// Maximum per-frame shift in samples.
pub fn max_shift(sample_rate: u32, level: NoiseLevel) -> usize {
    (sample_rate as f64 * MAX_SHIFT_MS * level.value() / 1000.0) as usize
}

/// Returns a frame-jittered, peak-normalized copy of `waveform`.
///
/// At level 0 the output is the peak-normalized input and `rng` is not
/// advanced. Output length always equals input length.
pub fn perturb_temporal(waveform: &Waveform, level: NoiseLevel, rng: &mut Pcg32) -> Waveform {
    if level.is_zero() || waveform.is_empty() {
        return peak_normalize(waveform);
    }

    let len = waveform.len();
    let frame = frame_len(waveform.sample_rate).max(1);
    let shift_limit = max_shift(waveform.sample_rate, level) as i64;
    let num_frames = len / frame;

    let mut output = vec![0.0; len];

    for i in 0..num_frames {
        let start = i * frame;
        let samples = &waveform.samples[start..start + frame];
        let shift = rng.gen_range(-shift_limit..=shift_limit);
        overlap_add(&mut output, samples, start as i64 + shift);
    }

    normalize_in_place(&mut output);

    tracing::debug!(
        level = level.value(),
        frames = num_frames,
        frame_len = frame,
        max_shift = shift_limit,
        "temporal frame jitter"
    );

    waveform.with_samples(output)
}

/// Adds `frame` into `output` starting at `position`, clipped to the buffer.
fn overlap_add(output: &mut [f64], frame: &[f64], position: i64) {
    let len = output.len() as i64;
    let skip = (-position).max(0) as usize;
    let dest_start = position.max(0);
    if dest_start >= len || skip >= frame.len() {
        return;
    }
    let dest_start = dest_start as usize;
    let available = output.len() - dest_start;
    let count = (frame.len() - skip).min(available);

    for (dst, src) in output[dest_start..dest_start + count]
        .iter_mut()
        .zip(&frame[skip..skip + count])
    {
        *dst += *src;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use crate::waveform::SAMPLE_RATE;
    use std::f64::consts::PI;

    fn chirp(len: usize) -> Waveform {
        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE as f64;
                0.5 * (2.0 * PI * (200.0 + 400.0 * t) * t).sin()
            })
            .collect();
        Waveform::new(samples, SAMPLE_RATE).unwrap()
    }

    #[test]
    fn test_frame_geometry() {
        assert_eq!(frame_len(44_100), 441);
        assert_eq!(max_shift(44_100, NoiseLevel::FULL), 441);
        assert_eq!(max_shift(44_100, NoiseLevel::new(0.5).unwrap()), 220);
        assert_eq!(max_shift(44_100, NoiseLevel::ZERO), 0);
    }

    #[test]
    fn test_zero_level_is_normalized_identity() {
        let input = chirp(5000);
        let mut rng = create_rng(1);
        let mut reference = create_rng(1);

        let out = perturb_temporal(&input, NoiseLevel::ZERO, &mut rng);

        assert_eq!(out, peak_normalize(&input));
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_length_preserved_for_all_levels() {
        let input = chirp(10_000);
        for percent in [1u8, 10, 25, 50, 75, 100] {
            let level = NoiseLevel::from_percent(percent).unwrap();
            let out = perturb_temporal(&input, level, &mut create_rng(percent as u32));
            assert_eq!(out.len(), input.len());
            assert!((out.peak() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_trailing_partial_frame_is_zero() {
        // 3 full frames plus 100 trailing samples; tiny level so shifts are 0.
        let input = Waveform::new(vec![0.5; 441 * 3 + 100], SAMPLE_RATE).unwrap();
        let level = NoiseLevel::new(0.001).unwrap();
        let out = perturb_temporal(&input, level, &mut create_rng(2));

        assert_eq!(max_shift(SAMPLE_RATE, level), 0);
        assert!(out.samples[..441 * 3].iter().all(|&s| (s - 1.0).abs() < 1e-12));
        assert!(out.samples[441 * 3..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_input_shorter_than_frame() {
        let input = Waveform::new(vec![0.3; 100], SAMPLE_RATE).unwrap();
        let out = perturb_temporal(&input, NoiseLevel::FULL, &mut create_rng(3));
        assert_eq!(out.len(), 100);
        assert!(out.is_silent());
    }

    #[test]
    fn test_overlap_add_clips_at_edges() {
        let mut out = vec![0.0; 5];
        overlap_add(&mut out, &[1.0, 2.0, 3.0], -2);
        assert_eq!(out, vec![3.0, 0.0, 0.0, 0.0, 0.0]);

        overlap_add(&mut out, &[1.0, 2.0, 3.0], 3);
        assert_eq!(out, vec![3.0, 0.0, 0.0, 1.0, 2.0]);

        overlap_add(&mut out, &[1.0, 1.0], 7);
        overlap_add(&mut out, &[1.0, 1.0], -5);
        assert_eq!(out, vec![3.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_input_untouched() {
        let input = chirp(3000);
        let copy = input.clone();
        let _ = perturb_temporal(&input, NoiseLevel::FULL, &mut create_rng(4));
        assert_eq!(input, copy);
    }
}
