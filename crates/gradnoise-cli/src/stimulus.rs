//! Input stimuli and their perturbation for one noise level.

use std::path::Path;

use anyhow::{bail, Result};
use gradnoise_engine::rng::create_stream_rng;
use gradnoise_engine::{
    fit_to_duration, perturb_score, perturb_waveform, EngineResult, NoiseLevel, PianoSynth,
    PipelineOptions, Score, Strategy, Waveform,
};

/// File extensions accepted as inputs, lowercase.
pub const INPUT_EXTENSIONS: &[&str] = &["mid", "midi", "wav"];

/// A loaded input: a symbolic score or recorded audio.
#[derive(Debug, Clone)]
pub enum Stimulus {
    /// Parsed MIDI file.
    Score(Score),
    /// Decoded WAV file.
    Audio(Waveform),
}

/// Everything needed to render one (input, level) output.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings<'a> {
    /// Strategy to apply.
    pub strategy: Strategy,
    /// Run seed.
    pub seed: u32,
    /// Score pipeline options.
    pub pipeline: &'a PipelineOptions,
    /// Optional fixed output duration in seconds.
    pub clip_duration: Option<f64>,
}

/// True when `path` has one of [`INPUT_EXTENSIONS`].
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.as_str()))
}

/// Output file name for an input base name and noise percentage.
pub fn output_file_name(base_name: &str, noise_percent: u8) -> String {
    format!("{}_noise_{}percent.wav", base_name, noise_percent)
}

/// Base name used for output naming and stream derivation.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

impl Stimulus {
    /// Loads a MIDI or WAV file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mid" | "midi" => Ok(Stimulus::Score(crate::midi::load_score(path)?)),
            "wav" => Ok(Stimulus::Audio(crate::audio_input::load_waveform(path)?)),
            other => bail!(
                "Unsupported input type '{}' for {} (expected .mid, .midi or .wav)",
                other,
                path.display()
            ),
        }
    }

    /// Short description for progress output.
    pub fn describe(&self) -> String {
        match self {
            Stimulus::Score(score) => format!(
                "{} notes in {} tracks, {:.2}s",
                score.note_count(),
                score.tracks.len(),
                score.end_time()
            ),
            Stimulus::Audio(wave) => format!(
                "{} samples at {} Hz, {:.2}s",
                wave.len(),
                wave.sample_rate,
                wave.duration_seconds()
            ),
        }
    }

    /// Produces the perturbed waveform for one noise percentage.
    ///
    /// The random stream is derived from `(seed, key, noise_percent)`, so any
    /// single output can be reproduced without rerunning the batch.
    pub fn render(
        &self,
        key: &str,
        noise_percent: u8,
        settings: &RenderSettings<'_>,
    ) -> EngineResult<Waveform> {
        let level = NoiseLevel::from_percent(noise_percent)?;
        let mut rng = create_stream_rng(settings.seed, key, noise_percent);

        let waveform = match self {
            Stimulus::Score(score) => perturb_score(
                score,
                settings.strategy,
                level,
                settings.pipeline,
                &PianoSynth::default(),
                &mut rng,
            )?,
            Stimulus::Audio(wave) => perturb_waveform(wave, settings.strategy, level, &mut rng)?,
        };

        match settings.clip_duration {
            Some(seconds) => fit_to_duration(&waveform, seconds),
            None => Ok(waveform),
        }
    }
}
