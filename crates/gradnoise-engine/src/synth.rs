//! Score-to-signal rendering.
//!
//! The engine only talks to the [`Synthesizer`] trait. [`PianoSynth`] is the
//! shipped implementation: a deterministic additive voice with a decaying
//! harmonic series, loosely shaped like a struck string.

use std::f64::consts::PI;

use crate::score::{Note, Score};
use crate::waveform::{Waveform, SAMPLE_RATE};

/// Renders a score to audio.
pub trait Synthesizer {
    /// Sample rate of rendered waveforms, in Hz.
    fn sample_rate(&self) -> u32;

    /// Renders `score` to a waveform of `ceil(score.end_time() * sample_rate)`
    /// samples. Rendering is a pure snapshot of the score.
    fn render(&self, score: &Score) -> Waveform;
}

/// Converts a MIDI note number to a frequency in Hz (A4 = 440 Hz).
#[inline]
pub fn midi_to_freq(pitch: u8) -> f64 {
    440.0 * 2.0_f64.powf((pitch as f64 - 69.0) / 12.0)
}

/// Additive piano-like synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct PianoSynth {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Partial amplitudes (index 0 = fundamental).
    pub harmonics: Vec<f64>,
    /// Attack ramp, in seconds.
    pub attack: f64,
    /// Exponential decay rate of the fundamental, in 1/s. Higher partials
    /// decay proportionally faster.
    pub decay_rate: f64,
    /// Fade-out applied before the note offset, in seconds.
    pub release: f64,
}

impl Default for PianoSynth {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            harmonics: vec![1.0, 0.5, 0.33, 0.25, 0.12, 0.08, 0.05, 0.03],
            attack: 0.005,
            decay_rate: 1.5,
            release: 0.03,
        }
    }
}

impl PianoSynth {
    /// Creates the default voice at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Envelope gain at `t` seconds into a note lasting `duration` seconds.
    fn envelope(&self, t: f64, duration: f64) -> f64 {
        let attack = if self.attack > 0.0 {
            (t / self.attack).min(1.0)
        } else {
            1.0
        };
        let release_time = self.release.min(duration / 2.0);
        let remaining = duration - t;
        let release = if release_time > 0.0 && remaining < release_time {
            (remaining / release_time).max(0.0)
        } else {
            1.0
        };
        attack * release
    }

    /// Adds one note into `buffer`.
    fn render_note(&self, note: &Note, buffer: &mut [f64]) {
        let sr = self.sample_rate as f64;
        let nyquist = sr / 2.0;
        let start = (note.onset * sr).round() as usize;
        let end = ((note.offset * sr).round() as usize).min(buffer.len());
        if start >= end {
            return;
        }

        let fundamental = midi_to_freq(note.pitch);
        let gain = note.velocity as f64 / 127.0;
        let duration = note.duration();

        for (i, slot) in buffer[start..end].iter_mut().enumerate() {
            let t = i as f64 / sr;
            let env = self.envelope(t, duration);
            let mut sample = 0.0;
            for (h, &amp) in self.harmonics.iter().enumerate() {
                let n = (h + 1) as f64;
                let freq = fundamental * n;
                if freq >= nyquist {
                    break;
                }
                let decay = (-self.decay_rate * n.sqrt() * t).exp();
                sample += amp * decay * (2.0 * PI * freq * t).sin();
            }
            *slot += gain * env * sample;
        }
    }
}

impl Synthesizer for PianoSynth {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn render(&self, score: &Score) -> Waveform {
        let num_samples = (score.end_time() * self.sample_rate as f64).ceil() as usize;
        let mut buffer = vec![0.0; num_samples];

        let mut rendered = 0usize;
        for track in score.tracks.iter().filter(|t| !t.is_drum) {
            for note in &track.notes {
                self.render_note(note, &mut buffer);
                rendered += 1;
            }
        }

        tracing::debug!(
            notes = rendered,
            samples = num_samples,
            sample_rate = self.sample_rate,
            "rendered score"
        );

        Waveform {
            samples: buffer,
            sample_rate: self.sample_rate,
        }
    }
}
