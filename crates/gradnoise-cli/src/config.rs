//! Batch configuration.
//!
//! A batch run is described by a [`BatchConfig`]. It can be loaded from a
//! JSON file and then overridden field by field from the command line.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gradnoise_engine::{EngineError, PipelineOptions, Strategy};
use serde::{Deserialize, Serialize};

/// Noise levels used when none are configured, in percent.
pub const DEFAULT_NOISE_LEVELS: [u8; 5] = [0, 25, 50, 75, 100];

/// Run seed used when none is configured.
pub const DEFAULT_SEED: u32 = 42;

/// Parameters of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Directory scanned recursively for `.mid`, `.midi` and `.wav` inputs.
    pub input_dir: Option<PathBuf>,
    /// Directory receiving the perturbed WAV files and the summary.
    pub output_dir: Option<PathBuf>,
    /// Noise levels in percent, processed in this order.
    pub noise_levels: Vec<u8>,
    /// Perturbation strategy.
    pub strategy: Strategy,
    /// Crop or pad every output to this many seconds.
    pub clip_duration: Option<f64>,
    /// Run seed; per-output streams are derived from it.
    pub seed: u32,
    /// Score pipeline options.
    pub pipeline: PipelineOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            noise_levels: DEFAULT_NOISE_LEVELS.to_vec(),
            strategy: Strategy::Symbolic,
            clip_duration: None,
            seed: DEFAULT_SEED,
            pipeline: PipelineOptions::default(),
        }
    }
}

impl BatchConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.noise_levels.is_empty() {
            return Err(EngineError::invalid_param(
                "noise_levels",
                "at least one noise level is required",
            ));
        }
        if let Some(&bad) = self.noise_levels.iter().find(|&&p| p > 100) {
            return Err(EngineError::invalid_param(
                "noise_levels",
                format!("percentages must be within 0..=100, got {}", bad),
            ));
        }
        if let Some(seconds) = self.clip_duration {
            if !seconds.is_finite() || seconds <= 0.0 {
                return Err(EngineError::invalid_param(
                    "clip_duration",
                    format!("must be a positive number of seconds, got {}", seconds),
                ));
            }
        }
        Ok(())
    }
}
