//! Encoded WAV output for one waveform.

use std::fs;
use std::path::Path;

use crate::error::EngineResult;
use crate::waveform::Waveform;

use super::format::WavFormat;
use super::pcm::pcm_hash;
use super::writer::{samples_to_pcm16, write_wav_to_vec};

/// An encoded mono WAV file plus its PCM hash.
#[derive(Debug, Clone)]
pub struct WavResult {
    /// Complete WAV file bytes.
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of the PCM payload only.
    pub pcm_hash: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
}

impl WavResult {
    /// Encodes mono samples.
    pub fn from_mono(samples: &[f64], sample_rate: u32) -> Self {
        let pcm = samples_to_pcm16(samples);
        Self {
            wav_data: write_wav_to_vec(&WavFormat::mono(sample_rate), &pcm),
            pcm_hash: pcm_hash(&pcm),
            sample_rate,
            num_samples: samples.len(),
        }
    }

    /// Encodes a waveform at its own sample rate.
    pub fn from_waveform(waveform: &Waveform) -> Self {
        Self::from_mono(&waveform.samples, waveform.sample_rate)
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }

    /// Writes the WAV bytes to `path`.
    pub fn write_to_file(&self, path: &Path) -> EngineResult<()> {
        fs::write(path, &self.wav_data)?;
        Ok(())
    }
}
