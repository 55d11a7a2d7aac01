//! Additive pink noise calibrated to a target signal-to-noise ratio.

use rand_pcg::Pcg32;

use crate::colored_noise::{powerlaw_noise, PINK_EXPONENT};
use crate::error::{EngineError, EngineResult};
use crate::level::NoiseLevel;
use crate::normalize::limit_in_place;
use crate::waveform::{power, Waveform};

/// SNR used at noise level 0, in dB.
pub const CLEAN_SNR_DB: f64 = 40.0;

/// SNR used at noise level 1, in dB.
pub const NOISY_SNR_DB: f64 = -20.0;

/// Maps a noise level linearly onto `[CLEAN_SNR_DB, NOISY_SNR_DB]`.
pub fn snr_for_noise_level(level: NoiseLevel) -> f64 {
    CLEAN_SNR_DB + (NOISY_SNR_DB - CLEAN_SNR_DB) * level.value()
}

/// Generates pink noise for `waveform` scaled so that
/// `10·log10(P_signal / P_noise) == snr_db` on the generated samples.
///
/// Returns silence when the waveform is empty or has zero power; in that case
/// `rng` is not advanced.
pub fn scaled_noise(waveform: &Waveform, snr_db: f64, rng: &mut Pcg32) -> EngineResult<Vec<f64>> {
    if !snr_db.is_finite() {
        return Err(EngineError::invalid_param(
            "snr_db",
            format!("must be finite, got {}", snr_db),
        ));
    }

    let signal_power = waveform.power();
    if waveform.is_empty() || signal_power == 0.0 {
        return Ok(vec![0.0; waveform.len()]);
    }

    let mut noise = powerlaw_noise(waveform.len(), PINK_EXPONENT, rng)?;
    let noise_power = power(&noise);
    if noise_power == 0.0 {
        return Ok(noise);
    }

    let desired_power = signal_power / 10f64.powf(snr_db / 10.0);
    let gain = (desired_power / noise_power).sqrt();
    for sample in noise.iter_mut() {
        *sample *= gain;
    }

    Ok(noise)
}

/// Adds pink noise at `snr_db` to `waveform`.
///
/// If the sum peaks above 1.0 it is rescaled by its peak rather than clipped.
/// Empty or silent input passes through unchanged.
pub fn inject_noise(waveform: &Waveform, snr_db: f64, rng: &mut Pcg32) -> EngineResult<Waveform> {
    let noise = scaled_noise(waveform, snr_db, rng)?;

    let mut mixed: Vec<f64> = waveform
        .samples
        .iter()
        .zip(&noise)
        .map(|(s, n)| s + n)
        .collect();
    limit_in_place(&mut mixed);

    tracing::debug!(
        snr_db,
        signal_power = waveform.power(),
        samples = mixed.len(),
        "injected pink noise"
    );

    Ok(waveform.with_samples(mixed))
}

/// Empirical SNR in dB between a signal and a noise sequence.
pub fn measure_snr_db(signal: &[f64], noise: &[f64]) -> EngineResult<f64> {
    let noise_power = power(noise);
    if noise_power == 0.0 {
        return Err(EngineError::degenerate(
            "cannot measure SNR against zero noise power",
        ));
    }
    Ok(10.0 * (power(signal) / noise_power).log10())
}
