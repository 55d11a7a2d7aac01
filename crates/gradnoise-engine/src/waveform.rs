//! Sampled mono signal.

use crate::error::{EngineError, EngineResult};

/// Sample rate used throughout the engine.
pub const SAMPLE_RATE: u32 = 44_100;

/// A finite mono signal plus its sample rate.
///
/// Transforms never mutate a `Waveform` they are given; each returns a freshly
/// allocated one with the same sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Audio samples.
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform, rejecting a zero sample rate.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> EngineResult<Self> {
        if sample_rate == 0 {
            return Err(EngineError::invalid_param(
                "sample_rate",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Creates a silent waveform of `len` samples.
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![0.0; len],
            sample_rate,
        }
    }

    /// Returns a waveform with the same sample rate and new samples.
    pub fn with_samples(&self, samples: Vec<f64>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Maximum absolute sample value (0.0 for an empty waveform).
    pub fn peak(&self) -> f64 {
        peak(&self.samples)
    }

    /// Mean of squared samples (0.0 for an empty waveform).
    pub fn power(&self) -> f64 {
        power(&self.samples)
    }

    /// True when every sample is exactly zero.
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }
}

/// Maximum absolute value of a sample slice.
pub fn peak(samples: &[f64]) -> f64 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f64, |a, b| a.max(b))
}

/// Mean of squared samples.
pub fn power(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_sample_rate() {
        assert!(Waveform::new(vec![0.0], 0).is_err());
        assert!(Waveform::new(vec![0.0], SAMPLE_RATE).is_ok());
    }

    #[test]
    fn test_peak_and_power() {
        let wave = Waveform::new(vec![0.5, -1.0, 0.0, 0.5], SAMPLE_RATE).unwrap();
        assert_eq!(wave.peak(), 1.0);
        assert!((wave.power() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_empty_waveform() {
        let wave = Waveform::silence(0, SAMPLE_RATE);
        assert!(wave.is_empty());
        assert_eq!(wave.peak(), 0.0);
        assert_eq!(wave.power(), 0.0);
        assert!(wave.is_silent());
    }

    #[test]
    fn test_duration() {
        let wave = Waveform::silence(22_050, SAMPLE_RATE);
        assert!((wave.duration_seconds() - 0.5).abs() < 1e-12);
    }
}
