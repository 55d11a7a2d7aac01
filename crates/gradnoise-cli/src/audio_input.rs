//! WAV file loading for waveform-domain strategies.

use std::path::Path;

use anyhow::{Context, Result};
use gradnoise_engine::{EngineError, Waveform};

/// Loads a WAV file as a mono waveform at its native sample rate.
///
/// Integer PCM of any bit depth and 32-bit float are accepted. Multichannel
/// audio is downmixed by averaging the channels of each frame.
pub fn load_waveform(path: &Path) -> Result<Waveform> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<Vec<f64>, _>>()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<f64>, _>>(),
    }
    .with_context(|| format!("Failed to decode samples: {}", path.display()))?;

    if interleaved.is_empty() {
        return Err(EngineError::empty(format!("WAV file has no samples: {}", path.display())).into());
    }

    let samples = downmix(&interleaved, spec.channels.max(1) as usize);
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        samples = samples.len(),
        "loaded WAV input"
    );

    Ok(Waveform::new(samples, spec.sample_rate)?)
}

/// Averages interleaved channels into one.
fn downmix(interleaved: &[f64], channels: usize) -> Vec<f64> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect()
}
