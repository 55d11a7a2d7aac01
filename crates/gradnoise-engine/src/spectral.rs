//! Spectral perturbation: magnitude/phase blending and phase jitter.
//!
//! The waveform is analyzed with the fixed STFT from [`crate::stft`], each bin
//! is split into magnitude and phase, perturbed, recombined and resynthesized
//! to the original length. The result is always peak-normalized.

use std::f64::consts::PI;

use rand::Rng;
use rand_pcg::Pcg32;
use rustfft::num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::level::NoiseLevel;
use crate::normalize::{normalize_in_place, peak_normalize};
use crate::stft::Stft;
use crate::waveform::Waveform;

/// Spectral perturbation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpectralMode {
    /// Interpolate magnitude and phase towards uniform random fields.
    MagnitudePhaseBlend,
    /// Keep magnitudes; add uniform phase noise of up to `±2π·level`.
    PhaseJitterOnly,
}

/// Returns a spectrally perturbed, peak-normalized copy of `waveform`.
///
/// At level 0 no analysis is run and `rng` is not advanced; the output is
/// the peak-normalized input. Empty input yields empty output.
pub fn perturb_spectral(
    waveform: &Waveform,
    level: NoiseLevel,
    mode: SpectralMode,
    rng: &mut Pcg32,
) -> Waveform {
    if level.is_zero() || waveform.is_empty() {
        return peak_normalize(waveform);
    }

    let stft = Stft::new();
    let mut spectrogram = stft.forward(&waveform.samples);
    let l = level.value();

    match mode {
        SpectralMode::MagnitudePhaseBlend => {
            let max_magnitude = spectrogram.max_magnitude();
            for frame in spectrogram.frames.iter_mut() {
                for bin in frame.iter_mut() {
                    let random_magnitude = rng.gen::<f64>() * max_magnitude;
                    let random_phase = rng.gen_range(-PI..=PI);
                    let magnitude = (1.0 - l) * bin.norm() + l * random_magnitude;
                    let phase = (1.0 - l) * bin.arg() + l * random_phase;
                    *bin = Complex::from_polar(magnitude, phase);
                }
            }
        }
        SpectralMode::PhaseJitterOnly => {
            let max_jitter = 2.0 * PI * l;
            for frame in spectrogram.frames.iter_mut() {
                for bin in frame.iter_mut() {
                    let jitter = rng.gen_range(-max_jitter..=max_jitter);
                    *bin = Complex::from_polar(bin.norm(), bin.arg() + jitter);
                }
            }
        }
    }

    let mut samples = stft.inverse(&spectrogram, waveform.len());
    normalize_in_place(&mut samples);

    tracing::debug!(
        ?mode,
        level = l,
        frames = spectrogram.frames.len(),
        samples = samples.len(),
        "spectral perturbation"
    );

    waveform.with_samples(samples)
}
