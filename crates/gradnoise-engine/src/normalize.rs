//! Peak normalization and centered crop/pad.
//!
//! Every perturbation transform ends with [`peak_normalize`]. The fit helpers
//! are only used by callers that need a fixed clip length.

use crate::error::{EngineError, EngineResult};
use crate::waveform::{peak, Waveform};

/// Scales a waveform so its maximum absolute sample is 1.0.
///
/// A silent (all-zero) or empty waveform is returned unchanged.
pub fn peak_normalize(waveform: &Waveform) -> Waveform {
    waveform.with_samples(normalized_samples(&waveform.samples))
}

/// Scales samples in place to a peak of 1.0; no-op when the peak is zero.
pub fn normalize_in_place(samples: &mut [f64]) {
    let current_peak = peak(samples);

    if current_peak > 0.0 {
        let gain = 1.0 / current_peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

fn normalized_samples(samples: &[f64]) -> Vec<f64> {
    let mut out = samples.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Rescales samples in place by the peak only when it exceeds 1.0.
///
/// Used where clipping must be prevented without raising quieter signals.
pub fn limit_in_place(samples: &mut [f64]) {
    let current_peak = peak(samples);

    if current_peak > 1.0 {
        let gain = 1.0 / current_peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Forces a waveform to exactly `target_len` samples.
///
/// Longer input is cropped around its center; the first kept sample is
/// `(len - target_len) / 2`, so an odd excess removes one more sample from the
/// end. Shorter input is zero-padded with `(target_len - len) / 2` samples on
/// the left and the remainder on the right.
pub fn fit_to_length(waveform: &Waveform, target_len: usize) -> Waveform {
    let len = waveform.len();

    if target_len < len {
        let start = (len - target_len) / 2;
        return waveform.with_samples(waveform.samples[start..start + target_len].to_vec());
    }

    let padding = target_len - len;
    let pad_left = padding / 2;
    let mut samples = vec![0.0; target_len];
    samples[pad_left..pad_left + len].copy_from_slice(&waveform.samples);
    waveform.with_samples(samples)
}

/// Forces a waveform to `seconds` of audio at its own sample rate.
pub fn fit_to_duration(waveform: &Waveform, seconds: f64) -> EngineResult<Waveform> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(EngineError::invalid_param(
            "clip_duration",
            format!("must be a non-negative number of seconds, got {}", seconds),
        ));
    }
    let target_len = (seconds * waveform.sample_rate as f64) as usize;
    Ok(fit_to_length(waveform, target_len))
}
