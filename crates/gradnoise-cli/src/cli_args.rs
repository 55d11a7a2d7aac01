//! CLI argument definitions for the gradnoise command-line interface.
//!
//! All `#[derive(Parser)]`, `#[derive(Subcommand)]` and `#[derive(Args)]`
//! types are defined here, keeping `main.rs` focused on dispatch logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gradnoise_cli::config::BatchConfig;
use gradnoise_engine::{Attributes, DrumPolicy, Strategy, TimingScale};

/// gradnoise - graded noise perturbation of musical stimuli
#[derive(Parser)]
#[command(name = "gradnoise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Render every input of a directory at every noise level
    Batch {
        /// Directory scanned recursively for .mid, .midi and .wav files
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory receiving the outputs and batch_summary.json
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Noise levels in percent, comma separated (default: 0,25,50,75,100)
        #[arg(short, long, value_delimiter = ',')]
        levels: Option<Vec<u8>>,

        #[command(flatten)]
        render: RenderFlags,
    },

    /// Render a single input at a single noise level
    Perturb {
        /// MIDI or WAV input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV path (default: batch file name next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Noise level in percent
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,

        #[command(flatten)]
        render: RenderFlags,
    },
}

/// Rendering options shared by both commands. Set flags override the config
/// file, which overrides the defaults.
#[derive(Args, Debug, Default)]
pub(crate) struct RenderFlags {
    /// JSON batch config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Perturbation strategy: symbolic, spectral-blend, phase-jitter,
    /// frame-jitter or snr-noise
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// Run seed
    #[arg(long)]
    pub seed: Option<u32>,

    /// Crop or zero-pad every output to this many seconds
    #[arg(long)]
    pub clip_duration: Option<f64>,

    /// Allow pitches anywhere on the piano instead of the padded original range
    #[arg(long)]
    pub unconstrained: bool,

    /// Randomize pitch only, keeping onsets and durations
    #[arg(long)]
    pub pitch_only: bool,

    /// Use a fixed timing window instead of one scaled by the noise level
    #[arg(long)]
    pub fixed_timing: bool,

    /// Drop percussion tracks instead of rendering them as piano
    #[arg(long)]
    pub exclude_drums: bool,
}

impl RenderFlags {
    /// Loads the config file (or defaults) and applies the set flags.
    pub fn resolve(&self) -> anyhow::Result<BatchConfig> {
        let mut config = BatchConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Applies the set flags to `config`.
    pub fn apply(&self, config: &mut BatchConfig) {
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.clip_duration.is_some() {
            config.clip_duration = self.clip_duration;
        }

        let randomize = &mut config.pipeline.randomize;
        if self.unconstrained {
            randomize.preserve_range = false;
        }
        if self.pitch_only {
            randomize.attributes = Attributes::PITCH_ONLY;
        }
        if self.fixed_timing {
            randomize.timing = TimingScale::Fixed;
        }
        if self.exclude_drums {
            config.pipeline.drums = DrumPolicy::Exclude;
        }
    }
}
