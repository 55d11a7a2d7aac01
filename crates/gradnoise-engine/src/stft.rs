//! Short-time Fourier transform with overlap-add inverse.
//!
//! Frames are centered: the signal is zero-padded by `FFT_SIZE / 2` on both
//! sides before framing, so frame `t` is centered on sample `t * HOP_SIZE`.
//! Only the one-sided spectrum (`FFT_SIZE / 2 + 1` bins) is stored; the
//! inverse rebuilds the Hermitian half before the complex IFFT.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Fixed FFT window length.
pub const FFT_SIZE: usize = 2048;

/// Fixed hop between frames.
pub const HOP_SIZE: usize = FFT_SIZE / 4;

/// Number of stored bins per frame.
pub const NUM_BINS: usize = FFT_SIZE / 2 + 1;

/// Window-sum-square values below this are treated as uncovered.
const WSS_FLOOR: f64 = 1e-10;

/// One-sided complex spectrogram, `frames[t][k]`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Spectral frames, each of `NUM_BINS` bins.
    pub frames: Vec<Vec<Complex<f64>>>,
    /// Length of the signal the spectrogram was computed from.
    pub signal_len: usize,
}

impl Spectrogram {
    /// Largest bin magnitude across all frames.
    pub fn max_magnitude(&self) -> f64 {
        self.frames
            .iter()
            .flat_map(|frame| frame.iter().map(|c| c.norm()))
            .fold(0.0_f64, f64::max)
    }
}

/// Computes the periodic Hann window value at a given index.
#[inline]
fn hann_window(i: usize, size: usize) -> f64 {
    0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos())
}

/// Forward/inverse STFT pair with cached FFT plans.
pub struct Stft {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
}

impl Default for Stft {
    fn default() -> Self {
        Self::new()
    }
}

impl Stft {
    /// Plans the forward and inverse FFTs.
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(FFT_SIZE),
            inverse: planner.plan_fft_inverse(FFT_SIZE),
            window: (0..FFT_SIZE).map(|i| hann_window(i, FFT_SIZE)).collect(),
        }
    }

    /// Number of frames produced for a signal of `len` samples.
    pub fn num_frames(len: usize) -> usize {
        1 + len / HOP_SIZE
    }

    /// Analyzes `samples` into a one-sided spectrogram.
    pub fn forward(&self, samples: &[f64]) -> Spectrogram {
        let pad = FFT_SIZE / 2;
        let num_frames = Self::num_frames(samples.len());

        let mut padded = vec![0.0; pad + samples.len() + FFT_SIZE];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let mut frames = Vec::with_capacity(num_frames);
        let mut buffer = vec![Complex::new(0.0, 0.0); FFT_SIZE];

        for t in 0..num_frames {
            let start = t * HOP_SIZE;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.forward.process(&mut buffer);
            frames.push(buffer[..NUM_BINS].to_vec());
        }

        Spectrogram {
            frames,
            signal_len: samples.len(),
        }
    }

    /// Resynthesizes `len` samples from a one-sided spectrogram.
    ///
    /// Uses windowed overlap-add normalized by the squared-window sum, so an
    /// unmodified spectrogram reconstructs its source up to rounding.
    pub fn inverse(&self, spectrogram: &Spectrogram, len: usize) -> Vec<f64> {
        let pad = FFT_SIZE / 2;
        let num_frames = spectrogram.frames.len();
        let total = FFT_SIZE + HOP_SIZE * num_frames.saturating_sub(1);

        let mut output = vec![0.0; total];
        let mut window_sum = vec![0.0; total];
        let mut buffer = vec![Complex::new(0.0, 0.0); FFT_SIZE];

        for (t, frame) in spectrogram.frames.iter().enumerate() {
            fill_hermitian(frame, &mut buffer);
            self.inverse.process(&mut buffer);

            let start = t * HOP_SIZE;
            for i in 0..FFT_SIZE {
                // IFFT result needs to be scaled by 1/N
                let sample = buffer[i].re / FFT_SIZE as f64;
                output[start + i] += sample * self.window[i];
                window_sum[start + i] += self.window[i] * self.window[i];
            }
        }

        (0..len)
            .map(|n| {
                let idx = n + pad;
                if idx < total && window_sum[idx] > WSS_FLOOR {
                    output[idx] / window_sum[idx]
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Expands a one-sided frame into a full conjugate-symmetric FFT buffer.
fn fill_hermitian(frame: &[Complex<f64>], buffer: &mut [Complex<f64>]) {
    buffer[..NUM_BINS].copy_from_slice(frame);
    for k in 1..FFT_SIZE / 2 {
        buffer[FFT_SIZE - k] = frame[k].conj();
    }
}
