//! Perturb command implementation
//!
//! Renders a single input at a single noise level. The random stream is keyed
//! on the input's base name, so the output is bit-identical to the file a batch
//! run with the same seed writes for that input and level.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use gradnoise_engine::{PipelineOptions, Strategy, WavResult};

use crate::stimulus::{base_name, output_file_name, RenderSettings, Stimulus};

/// Arguments of one perturb run.
#[derive(Debug, Clone)]
pub struct PerturbArgs {
    /// MIDI or WAV input.
    pub input: PathBuf,
    /// Output WAV path; defaults to the batch file name next to the input.
    pub output: Option<PathBuf>,
    /// Noise level in percent.
    pub noise_percent: u8,
    /// Strategy to apply.
    pub strategy: Strategy,
    /// Run seed.
    pub seed: u32,
    /// Score pipeline options.
    pub pipeline: PipelineOptions,
    /// Optional fixed output duration in seconds.
    pub clip_duration: Option<f64>,
}

impl PerturbArgs {
    /// Output path, falling back to `<input dir>/<base>_noise_<p>percent.wav`.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let dir = self.input.parent().unwrap_or_else(|| Path::new("."));
                dir.join(output_file_name(&base_name(&self.input), self.noise_percent))
            }
        }
    }
}

/// Run the perturb command
///
/// # Returns
/// Exit code: 0 success; errors are returned to `main`
pub fn run(args: &PerturbArgs) -> Result<ExitCode> {
    let start = Instant::now();
    let out_path = args.output_path();

    println!(
        "{} {} ({}, {}%)",
        "Perturbing:".cyan().bold(),
        args.input.display(),
        args.strategy,
        args.noise_percent
    );

    let stimulus = Stimulus::load(&args.input)
        .with_context(|| format!("Failed to load input: {}", args.input.display()))?;
    tracing::info!(input = %args.input.display(), "{}", stimulus.describe());

    let settings = RenderSettings {
        strategy: args.strategy,
        seed: args.seed,
        pipeline: &args.pipeline,
        clip_duration: args.clip_duration,
    };
    let waveform = stimulus.render(&base_name(&args.input), args.noise_percent, &settings)?;
    let wav = WavResult::from_waveform(&waveform);

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    wav.write_to_file(&out_path)
        .with_context(|| format!("Failed to write output: {}", out_path.display()))?;

    println!("{} {}", "Output:".green().bold(), out_path.display());
    println!("{} {:.2}s", "Duration:".dimmed(), wav.duration_seconds());
    println!("{} {}", "PCM hash:".dimmed(), wav.pcm_hash);
    println!(
        "{} {}ms",
        "Elapsed:".dimmed(),
        start.elapsed().as_millis()
    );

    Ok(ExitCode::SUCCESS)
}
