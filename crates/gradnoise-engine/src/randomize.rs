//! Symbolic randomization of note pitch, onset and duration.
//!
//! For each track, `round(level * N)` notes are picked (without replacement)
//! per attribute, independently for pitch, onset and duration. A note may be
//! picked for several attributes. Pitch changes are applied first, then onset
//! shifts, then duration changes, so a duration change is measured from the
//! already-shifted onset.

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::level::NoiseLevel;
use crate::score::{PitchRange, Score, Track, PITCH_RANGE_PADDING};

/// Largest onset shift / duration change at full noise, in seconds.
pub const MAX_TIME_CHANGE: f64 = 0.5;

/// Shortest duration any note of a randomized track may have, in seconds.
pub const MIN_NOTE_DURATION: f64 = 0.1;

/// Which note attributes are perturbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Perturb pitches.
    pub pitch: bool,
    /// Shift onsets (offsets follow).
    pub onset: bool,
    /// Stretch or shrink durations.
    pub duration: bool,
}

impl Attributes {
    /// Pitch, onset and duration.
    pub const ALL: Attributes = Attributes {
        pitch: true,
        onset: true,
        duration: true,
    };

    /// Pitch only; timing is left untouched.
    pub const PITCH_ONLY: Attributes = Attributes {
        pitch: true,
        onset: false,
        duration: false,
    };
}

impl Default for Attributes {
    fn default() -> Self {
        Self::ALL
    }
}

/// How the onset/duration window relates to the noise level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimingScale {
    /// Window is `±0.5 * level` seconds.
    #[default]
    Scaled,
    /// Window is `±0.5` seconds at any non-zero level.
    Fixed,
}

/// Randomization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizeOptions {
    /// Draw new pitches around the original pitch (normal distribution,
    /// clamped to the padded track range) instead of uniformly over the
    /// piano range.
    pub preserve_range: bool,
    /// Timing window policy.
    pub timing: TimingScale,
    /// Attributes to perturb.
    pub attributes: Attributes,
}

impl RandomizeOptions {
    /// Range-preserving pitches, level-scaled timing.
    pub fn preserving() -> Self {
        Self {
            preserve_range: true,
            timing: TimingScale::Scaled,
            attributes: Attributes::ALL,
        }
    }

    /// Uniform piano-range pitches, level-scaled timing.
    pub fn unconstrained() -> Self {
        Self {
            preserve_range: false,
            ..Self::preserving()
        }
    }

    /// Uniform piano-range pitches and a fixed ±0.5 s timing window.
    pub fn fixed_window() -> Self {
        Self {
            preserve_range: false,
            timing: TimingScale::Fixed,
            attributes: Attributes::ALL,
        }
    }

    /// Same policy restricted to `attributes`.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    fn time_window(&self, level: NoiseLevel) -> f64 {
        match self.timing {
            TimingScale::Scaled => MAX_TIME_CHANGE * level.value(),
            TimingScale::Fixed => MAX_TIME_CHANGE,
        }
    }
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self::preserving()
    }
}

/// Returns a randomized copy of `score`; the input is never modified.
///
/// At level 0 the copy is returned untouched and `rng` is not advanced.
/// Tracks without notes and tracks still flagged as percussion are skipped.
pub fn randomize(
    score: &Score,
    level: NoiseLevel,
    options: &RandomizeOptions,
    rng: &mut Pcg32,
) -> EngineResult<Score> {
    let mut out = score.clone();
    if level.is_zero() {
        return Ok(out);
    }

    for (track_index, track) in out.tracks.iter_mut().enumerate() {
        if track.notes.is_empty() || track.is_drum {
            continue;
        }
        let changed = randomize_track(track, level, options, rng)?;
        tracing::debug!(
            track = track_index,
            notes = track.notes.len(),
            changed,
            level = level.value(),
            "randomized track"
        );
    }

    Ok(out)
}

/// Perturbs one non-empty track in place; returns the per-attribute count.
///
/// Every note leaves with at least [`MIN_NOTE_DURATION`], selected or not.
fn randomize_track(
    track: &mut Track,
    level: NoiseLevel,
    options: &RandomizeOptions,
    rng: &mut Pcg32,
) -> EngineResult<usize> {
    let num_notes = track.notes.len();
    let count = ((level.value() * num_notes as f64).round() as usize).min(num_notes);

    let (range, pitch_std) = if options.preserve_range {
        (track.pitch_range(PITCH_RANGE_PADDING), track.pitch_std())
    } else {
        (PitchRange::PIANO, 0.0)
    };

    let pick = |enabled: bool, rng: &mut Pcg32| -> Vec<usize> {
        if enabled {
            index::sample(rng, num_notes, count).into_vec()
        } else {
            Vec::new()
        }
    };
    let pitch_indices = pick(options.attributes.pitch, rng);
    let onset_indices = pick(options.attributes.onset, rng);
    let duration_indices = pick(options.attributes.duration, rng);

    for idx in pitch_indices {
        let note = &mut track.notes[idx];
        note.pitch = if options.preserve_range {
            let spread = Normal::new(note.pitch as f64, pitch_std * level.value())
                .map_err(|e| EngineError::invalid_param("pitch_std", e.to_string()))?;
            range.clamp(spread.sample(rng).round() as i64)
        } else {
            rng.gen_range(range.min..=range.max)
        };
    }

    let window = options.time_window(level);

    for idx in onset_indices {
        let note = &mut track.notes[idx];
        let duration = note.duration();
        let shift = rng.gen_range(-window..=window);
        note.onset = (note.onset + shift).max(0.0);
        note.offset = note.onset + duration;
    }

    for idx in duration_indices {
        let note = &mut track.notes[idx];
        let change = rng.gen_range(-window..=window);
        let duration = (note.duration() + change).max(MIN_NOTE_DURATION);
        note.offset = note.onset + duration;
    }

    for note in track.notes.iter_mut() {
        if note.duration() < MIN_NOTE_DURATION {
            note.offset = note.onset + MIN_NOTE_DURATION;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests;
