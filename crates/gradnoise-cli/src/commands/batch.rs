//! Batch command implementation
//!
//! Walks an input directory for MIDI and WAV stimuli, renders every
//! configured noise level for each input and writes one WAV per
//! (input, level) pair. Per-file failures are recorded and the run continues.
//! A `batch_summary.json` report is written to the output directory.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use walkdir::WalkDir;

use gradnoise_engine::{Strategy, WavResult};

use super::reporting::{error_code, print_banner, timestamp};
use crate::config::BatchConfig;
use crate::stimulus::{base_name, is_supported_input, output_file_name, RenderSettings, Stimulus};

/// Name of the summary report written to the output directory.
pub const SUMMARY_FILE: &str = "batch_summary.json";

/// Result of rendering one noise level for one input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputResult {
    /// Noise level in percent
    pub noise_percent: u8,
    /// Whether the output was written
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Stable engine error code, when the failure came from the engine
    pub error_code: Option<String>,
    /// Path of the written WAV file
    pub output_path: Option<String>,
    /// BLAKE3 hash of the PCM data
    pub pcm_hash: Option<String>,
    /// Duration of the written audio in seconds
    pub duration_seconds: Option<f64>,
    /// Render time in milliseconds
    pub duration_ms: u64,
}

/// Result of processing one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputResult {
    /// Path to the input file
    pub input_path: String,
    /// Base name used for outputs and stream derivation
    pub base_name: String,
    /// Load error, if the input could not be read
    pub error: Option<String>,
    /// Stable engine error code of the load error
    pub error_code: Option<String>,
    /// One entry per rendered noise level
    pub outputs: Vec<OutputResult>,
}

impl InputResult {
    /// True when the input loaded and every level was written.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.outputs.iter().all(|o| o.success)
    }
}

/// Summary report for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Timestamp of the run
    pub timestamp: String,
    /// Strategy applied
    pub strategy: Strategy,
    /// Run seed
    pub seed: u32,
    /// Noise levels in percent
    pub noise_levels: Vec<u8>,
    /// Clip duration, if any
    pub clip_duration: Option<f64>,
    /// Inputs found
    pub total_inputs: usize,
    /// Outputs written
    pub successful: usize,
    /// Failed outputs plus inputs that failed to load or were skipped
    pub failed: usize,
    /// Total runtime in seconds
    pub runtime_seconds: f64,
    /// Results for each input
    pub inputs: Vec<InputResult>,
}

/// Run the batch command
///
/// # Returns
/// Exit code: 0 success, 1 if any input or output failed
pub fn run(config: &BatchConfig) -> Result<ExitCode> {
    let start = Instant::now();
    config.validate()?;

    let input_dir = config
        .input_dir
        .as_deref()
        .context("No input directory given (use --input-dir or set input_dir in the config)")?;
    let output_dir = config
        .output_dir
        .as_deref()
        .context("No output directory given (use --output-dir or set output_dir in the config)")?;

    if !input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", input_dir.display());
    }

    print_banner("gradnoise batch");
    println!("{} {}", "Input directory:".blue().bold(), input_dir.display());
    println!("{} {}", "Output directory:".blue().bold(), output_dir.display());
    println!("{} {}", "Strategy:".blue().bold(), config.strategy);
    println!("{} {:?}", "Noise levels (%):".blue().bold(), config.noise_levels);
    println!("{} {}", "Seed:".blue().bold(), config.seed);
    if let Some(seconds) = config.clip_duration {
        println!("{} {:.2}s", "Clip duration:".blue().bold(), seconds);
    }
    println!();

    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let inputs = collect_inputs(input_dir);
    tracing::info!(count = inputs.len(), dir = %input_dir.display(), "collected inputs");
    println!(
        "{} Found {} input files to process",
        "INFO".blue().bold(),
        inputs.len()
    );
    println!();

    let settings = RenderSettings {
        strategy: config.strategy,
        seed: config.seed,
        pipeline: &config.pipeline,
        clip_duration: config.clip_duration,
    };

    let mut results = Vec::with_capacity(inputs.len());
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    for input in &inputs {
        let base = base_name(input);
        let result = match claimed.get(&base).copied() {
            Some(first) => duplicate_input(input, &base, first),
            None => {
                claimed.insert(base, input.as_path());
                process_input(input, output_dir, &config.noise_levels, &settings)
            }
        };
        if result.is_success() {
            println!("  {} {}", "OK".green(), result.base_name);
        } else {
            println!(
                "  {} {} - {}",
                "FAILED".red(),
                result.base_name,
                first_error(&result).unwrap_or("unknown error")
            );
        }
        results.push(result);
    }

    let successful = results
        .iter()
        .flat_map(|r| &r.outputs)
        .filter(|o| o.success)
        .count();
    let failed = results
        .iter()
        .map(|r| {
            let load_failure = usize::from(r.error.is_some());
            load_failure + r.outputs.iter().filter(|o| !o.success).count()
        })
        .sum();

    let summary = BatchSummary {
        timestamp: timestamp(),
        strategy: config.strategy,
        seed: config.seed,
        noise_levels: config.noise_levels.clone(),
        clip_duration: config.clip_duration,
        total_inputs: inputs.len(),
        successful,
        failed,
        runtime_seconds: start.elapsed().as_secs_f64(),
        inputs: results,
    };

    let summary_path = output_dir.join(SUMMARY_FILE);
    let summary_json =
        serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    fs::write(&summary_path, summary_json)
        .with_context(|| format!("Failed to write summary: {}", summary_path.display()))?;

    println!();
    print_banner("Batch Summary");
    println!("{} {}", "Inputs processed:".blue().bold(), summary.total_inputs);
    println!("{} {}", "Outputs written:".green().bold(), summary.successful);
    println!("{} {}", "Failed:".red().bold(), summary.failed);
    println!(
        "{} {:.2}s",
        "Total runtime:".blue().bold(),
        summary.runtime_seconds
    );
    println!(
        "{} {}",
        "Summary report:".blue().bold(),
        summary_path.display()
    );

    tracing::info!(
        successful = summary.successful,
        failed = summary.failed,
        "batch finished"
    );

    if summary.failed > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Recursively collects supported inputs, sorted for a deterministic order.
pub fn collect_inputs(dir: &Path) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_input(e.path()))
        .map(|e| e.into_path())
        .collect();
    inputs.sort();
    inputs
}

/// Failure record for an input whose base name an earlier input already
/// uses. Its outputs would overwrite the earlier ones, so nothing is rendered.
fn duplicate_input(path: &Path, base: &str, first: &Path) -> InputResult {
    let error = format!(
        "base name '{}' is already used by {}; outputs would collide",
        base,
        first.display()
    );
    tracing::warn!(input = %path.display(), %error, "skipping input");
    InputResult {
        input_path: path.to_string_lossy().to_string(),
        base_name: base.to_string(),
        error: Some(error),
        error_code: None,
        outputs: Vec::new(),
    }
}

/// Loads one input and renders every level; never fails.
fn process_input(
    path: &Path,
    output_dir: &Path,
    noise_levels: &[u8],
    settings: &RenderSettings<'_>,
) -> InputResult {
    let base = base_name(path);
    let mut result = InputResult {
        input_path: path.to_string_lossy().to_string(),
        base_name: base.clone(),
        error: None,
        error_code: None,
        outputs: Vec::new(),
    };

    let stimulus = match Stimulus::load(path) {
        Ok(stimulus) => stimulus,
        Err(e) => {
            tracing::warn!(input = %path.display(), error = %format!("{:#}", e), "failed to load input");
            result.error_code = error_code(&e);
            result.error = Some(format!("{:#}", e));
            return result;
        }
    };
    tracing::info!(input = %path.display(), "{}", stimulus.describe());

    for &percent in noise_levels {
        let output = render_level(&stimulus, &base, percent, output_dir, settings);
        if let Some(error) = &output.error {
            tracing::error!(input = %path.display(), noise_percent = percent, %error, "render failed");
        }
        result.outputs.push(output);
    }

    result
}

fn render_level(
    stimulus: &Stimulus,
    base: &str,
    percent: u8,
    output_dir: &Path,
    settings: &RenderSettings<'_>,
) -> OutputResult {
    let start = Instant::now();
    let mut output = OutputResult {
        noise_percent: percent,
        success: false,
        error: None,
        error_code: None,
        output_path: None,
        pcm_hash: None,
        duration_seconds: None,
        duration_ms: 0,
    };

    let out_path = output_dir.join(output_file_name(base, percent));
    let written = stimulus
        .render(base, percent, settings)
        .map(|waveform| WavResult::from_waveform(&waveform))
        .and_then(|wav| wav.write_to_file(&out_path).map(|_| wav));

    match written {
        Ok(wav) => {
            tracing::debug!(output = %out_path.display(), hash = %wav.pcm_hash, "wrote output");
            output.success = true;
            output.output_path = Some(out_path.to_string_lossy().to_string());
            output.duration_seconds = Some(wav.duration_seconds());
            output.pcm_hash = Some(wav.pcm_hash);
        }
        Err(e) => {
            output.error_code = Some(e.code().to_string());
            output.error = Some(e.to_string());
        }
    }

    output.duration_ms = start.elapsed().as_millis() as u64;
    output
}

fn first_error(result: &InputResult) -> Option<&str> {
    result
        .error
        .as_deref()
        .or_else(|| result.outputs.iter().find_map(|o| o.error.as_deref()))
}
