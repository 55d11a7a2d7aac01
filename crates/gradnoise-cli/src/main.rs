//! gradnoise CLI - graded noise perturbation of musical stimuli
//!
//! This binary renders MIDI and WAV stimuli at a series of noise levels,
//! either for a whole directory (`batch`) or for one file (`perturb`).

use clap::Parser;
use std::process::ExitCode;

use gradnoise_cli::commands::perturb::PerturbArgs;
use gradnoise_cli::{commands, logging};

mod cli_args;
use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Batch {
            input_dir,
            output_dir,
            levels,
            render,
        } => render.resolve().and_then(|mut config| {
            if input_dir.is_some() {
                config.input_dir = input_dir;
            }
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }
            if let Some(levels) = levels {
                config.noise_levels = levels;
            }
            commands::batch::run(&config)
        }),
        Commands::Perturb {
            input,
            output,
            level,
            render,
        } => render.resolve().and_then(|config| {
            config.validate()?;
            commands::perturb::run(&PerturbArgs {
                input,
                output,
                noise_percent: level,
                strategy: config.strategy,
                seed: config.seed,
                pipeline: config.pipeline,
                clip_duration: config.clip_duration,
            })
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
