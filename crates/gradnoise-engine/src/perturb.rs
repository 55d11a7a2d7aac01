//! Strategy dispatch.
//!
//! [`Strategy`] names every perturbation the engine offers. The dispatch
//! functions route a score or waveform plus a noise level to the matching
//! transform and peak-normalize the result.

use std::fmt;
use std::str::FromStr;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::level::NoiseLevel;
use crate::normalize::peak_normalize;
use crate::randomize::{randomize, RandomizeOptions};
use crate::score::{DrumPolicy, Score, ACOUSTIC_GRAND_PIANO};
use crate::snr::{inject_noise, snr_for_noise_level};
use crate::spectral::{perturb_spectral, SpectralMode};
use crate::synth::Synthesizer;
use crate::temporal::perturb_temporal;
use crate::waveform::Waveform;

/// A perturbation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Randomize the score, then synthesize.
    Symbolic,
    /// Spectral magnitude/phase blend.
    SpectralBlend,
    /// Spectral phase jitter.
    PhaseJitter,
    /// Temporal frame jitter.
    FrameJitter,
    /// Additive pink noise at a level-dependent SNR.
    SnrNoise,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Symbolic,
        Strategy::SpectralBlend,
        Strategy::PhaseJitter,
        Strategy::FrameJitter,
        Strategy::SnrNoise,
    ];

    /// Kebab-case name, as used in configs and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Symbolic => "symbolic",
            Strategy::SpectralBlend => "spectral-blend",
            Strategy::PhaseJitter => "phase-jitter",
            Strategy::FrameJitter => "frame-jitter",
            Strategy::SnrNoise => "snr-noise",
        }
    }

    /// True when the strategy needs a score rather than a waveform.
    pub fn is_symbolic(self) -> bool {
        self == Strategy::Symbolic
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
                EngineError::invalid_param(
                    "strategy",
                    format!("unknown strategy '{}', expected one of: {}", s, names.join(", ")),
                )
            })
    }
}

/// Options for the score pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Symbolic randomization policy.
    pub randomize: RandomizeOptions,
    /// Percussion handling when forcing the piano timbre.
    pub drums: DrumPolicy,
}

/// Applies a waveform-domain strategy.
///
/// Level 0 returns the peak-normalized input without consuming randomness,
/// for every strategy including SNR noise. `Strategy::Symbolic` is rejected
/// because it operates on scores.
pub fn perturb_waveform(
    waveform: &Waveform,
    strategy: Strategy,
    level: NoiseLevel,
    rng: &mut Pcg32,
) -> EngineResult<Waveform> {
    let perturbed = match strategy {
        Strategy::Symbolic => {
            return Err(EngineError::invalid_param(
                "strategy",
                "symbolic randomization needs a score, not a waveform",
            ))
        }
        _ if level.is_zero() => return Ok(peak_normalize(waveform)),
        Strategy::SpectralBlend => {
            perturb_spectral(waveform, level, SpectralMode::MagnitudePhaseBlend, rng)
        }
        Strategy::PhaseJitter => {
            perturb_spectral(waveform, level, SpectralMode::PhaseJitterOnly, rng)
        }
        Strategy::FrameJitter => perturb_temporal(waveform, level, rng),
        Strategy::SnrNoise => {
            let clean = peak_normalize(waveform);
            inject_noise(&clean, snr_for_noise_level(level), rng)?
        }
    };

    Ok(peak_normalize(&perturbed))
}

/// Runs the score pipeline for one noise level.
///
/// The score is forced to the piano timbre first. Symbolic strategies
/// randomize and then synthesize; waveform strategies synthesize and then
/// transform the rendering. The input score is never modified.
pub fn perturb_score<S: Synthesizer + ?Sized>(
    score: &Score,
    strategy: Strategy,
    level: NoiseLevel,
    options: &PipelineOptions,
    synth: &S,
    rng: &mut Pcg32,
) -> EngineResult<Waveform> {
    let piano = score.with_timbre(ACOUSTIC_GRAND_PIANO, options.drums);

    tracing::debug!(
        %strategy,
        level = level.value(),
        notes = piano.note_count(),
        "perturbing score"
    );

    if strategy.is_symbolic() {
        let randomized = randomize(&piano, level, &options.randomize, rng)?;
        return Ok(peak_normalize(&synth.render(&randomized)));
    }

    let rendered = synth.render(&piano);
    perturb_waveform(&rendered, strategy, level, rng)
}
