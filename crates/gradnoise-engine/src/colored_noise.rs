//! Gaussian noise with a power-law power spectral density.
//!
//! Noise is shaped in the frequency domain: every one-sided bin gets an
//! independent complex Gaussian coefficient scaled by `f^(-exponent / 2)`,
//! then a single inverse FFT produces the time signal. The output is scaled
//! to unit expected variance.

use rand::Rng;
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{EngineError, EngineResult};

/// Exponent of pink (1/f) noise.
pub const PINK_EXPONENT: f64 = 1.0;

/// Generates `len` samples of power-law noise with PSD ∝ `f^(-exponent)`.
///
/// Frequencies below `1 / len` are raised to that cutoff, so the DC bin gets
/// the same scale as the lowest resolvable frequency. An exponent of 0 gives
/// white noise.
pub fn powerlaw_noise<R: Rng + ?Sized>(
    len: usize,
    exponent: f64,
    rng: &mut R,
) -> EngineResult<Vec<f64>> {
    if !exponent.is_finite() {
        return Err(EngineError::invalid_param(
            "exponent",
            format!("must be finite, got {}", exponent),
        ));
    }
    if len == 0 {
        return Ok(Vec::new());
    }

    let num_bins = len / 2 + 1;
    let f_min = 1.0 / len as f64;

    let scales: Vec<f64> = (0..num_bins)
        .map(|k| {
            let f = (k as f64 / len as f64).max(f_min);
            f.powf(-exponent / 2.0)
        })
        .collect();

    let sigma = unit_variance_divisor(&scales, len);
    if sigma == 0.0 {
        return Ok(vec![0.0; len]);
    }

    let real: Vec<f64> = scales
        .iter()
        .map(|s| rng.sample::<f64, _>(StandardNormal) * s)
        .collect();
    let imag: Vec<f64> = scales
        .iter()
        .map(|s| rng.sample::<f64, _>(StandardNormal) * s)
        .collect();

    let mut spectrum: Vec<Complex<f64>> = real
        .into_iter()
        .zip(imag)
        .map(|(re, im)| Complex::new(re, im))
        .collect();

    // DC (and Nyquist for even lengths) must be real.
    spectrum[0] = Complex::new(spectrum[0].re * std::f64::consts::SQRT_2, 0.0);
    if len % 2 == 0 {
        let nyquist = num_bins - 1;
        spectrum[nyquist] = Complex::new(spectrum[nyquist].re * std::f64::consts::SQRT_2, 0.0);
    }

    let mut buffer = vec![Complex::new(0.0, 0.0); len];
    buffer[..num_bins].copy_from_slice(&spectrum);
    for k in 1..num_bins {
        let mirror = len - k;
        if mirror != k {
            buffer[mirror] = spectrum[k].conj();
        }
    }

    FftPlanner::new().plan_fft_inverse(len).process(&mut buffer);

    let norm = len as f64 * sigma;
    Ok(buffer.iter().map(|c| c.re / norm).collect())
}

/// Standard deviation of the unnormalized inverse transform.
fn unit_variance_divisor(scales: &[f64], len: usize) -> f64 {
    let last = scales.len() - 1;
    let sum_sq: f64 = scales
        .iter()
        .enumerate()
        .skip(1)
        .map(|(k, &s)| {
            let w = if k == last {
                s * (1 + len % 2) as f64 / 2.0
            } else {
                s
            };
            w * w
        })
        .sum();
    2.0 * sum_sq.sqrt() / len as f64
}
