//! Symbolic score model: tracks of timed note events.
//!
//! A [`Score`] is treated as a value. Randomization clones it and works on
//! the copy; synthesis takes a snapshot. Nothing downstream of a Score holds a
//! reference back into it.

use serde::{Deserialize, Serialize};

/// Lowest key of the standard 88-key piano (A0).
pub const PIANO_MIN_PITCH: u8 = 21;

/// Highest key of the standard 88-key piano (C8).
pub const PIANO_MAX_PITCH: u8 = 108;

/// General MIDI program for Acoustic Grand Piano.
pub const ACOUSTIC_GRAND_PIANO: u8 = 0;

/// Semitone padding applied around a track's observed pitches.
pub const PITCH_RANGE_PADDING: u8 = 12;

/// A single timed note event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// MIDI pitch (0-127).
    pub pitch: u8,
    /// MIDI velocity (0-127).
    pub velocity: u8,
    /// Onset in seconds.
    pub onset: f64,
    /// Offset in seconds, never before the onset.
    pub offset: f64,
}

impl Note {
    /// Creates a note; `offset` is raised to `onset` if it precedes it.
    pub fn new(pitch: u8, velocity: u8, onset: f64, offset: f64) -> Self {
        let onset = onset.max(0.0);
        Self {
            pitch: pitch.min(127),
            velocity: velocity.min(127),
            onset,
            offset: offset.max(onset),
        }
    }

    /// Duration in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.offset - self.onset
    }
}

/// Inclusive pitch bounds for a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    /// Lowest admissible pitch.
    pub min: u8,
    /// Highest admissible pitch.
    pub max: u8,
}

impl PitchRange {
    /// The full piano key range.
    pub const PIANO: PitchRange = PitchRange {
        min: PIANO_MIN_PITCH,
        max: PIANO_MAX_PITCH,
    };

    /// Clamps a (possibly out-of-range) pitch into this range.
    pub fn clamp(&self, pitch: i64) -> u8 {
        pitch.clamp(self.min as i64, self.max as i64) as u8
    }

    /// True when `pitch` lies within the range.
    pub fn contains(&self, pitch: u8) -> bool {
        (self.min..=self.max).contains(&pitch)
    }
}

/// An instrument track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track name, if the source provided one.
    pub name: Option<String>,
    /// General MIDI program number (timbre).
    pub program: u8,
    /// Whether this is a percussion track.
    pub is_drum: bool,
    /// Notes, in no particular order.
    pub notes: Vec<Note>,
}

impl Track {
    /// Creates a pitched track with the given program.
    pub fn new(program: u8) -> Self {
        Self {
            name: None,
            program,
            is_drum: false,
            notes: Vec::new(),
        }
    }

    /// Adds a note (builder style).
    pub fn with_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }

    /// Observed pitch range padded by `padding` semitones, clamped to the
    /// piano range. A track without notes gets the full piano range.
    ///
    /// Observed pitches outside the piano are moved onto it before padding,
    /// so `min <= max` holds for every track.
    pub fn pitch_range(&self, padding: u8) -> PitchRange {
        let on_piano = |p: u8| p.clamp(PIANO_MIN_PITCH, PIANO_MAX_PITCH);
        let lowest = self.notes.iter().map(|n| on_piano(n.pitch)).min();
        let highest = self.notes.iter().map(|n| on_piano(n.pitch)).max();

        match (lowest, highest) {
            (Some(lo), Some(hi)) => PitchRange {
                min: lo.saturating_sub(padding).max(PIANO_MIN_PITCH),
                max: hi.saturating_add(padding).min(PIANO_MAX_PITCH),
            },
            _ => PitchRange::PIANO,
        }
    }

    /// Population standard deviation of the track's pitches.
    pub fn pitch_std(&self) -> f64 {
        if self.notes.is_empty() {
            return 0.0;
        }
        let n = self.notes.len() as f64;
        let mean = self.notes.iter().map(|note| note.pitch as f64).sum::<f64>() / n;
        let variance = self
            .notes
            .iter()
            .map(|note| (note.pitch as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        variance.sqrt()
    }

    /// Latest note offset, in seconds.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(|n| n.offset).fold(0.0, f64::max)
    }
}

/// How percussion tracks are treated when forcing a single timbre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrumPolicy {
    /// Clear the drum flag so percussion tracks are rendered as pitched piano.
    #[default]
    AsPitched,
    /// Keep percussion tracks flagged; the synthesizer renders them silent.
    Exclude,
}

/// An ordered collection of tracks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Tracks in source order.
    pub tracks: Vec<Track>,
}

impl Score {
    /// Creates an empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a track (builder style).
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.push(track);
        self
    }

    /// Total number of notes across all tracks.
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// Latest note offset across all tracks, in seconds.
    pub fn end_time(&self) -> f64 {
        self.tracks.iter().map(Track::end_time).fold(0.0, f64::max)
    }

    /// Returns a copy with every track set to `program`, applying `drums`.
    pub fn with_timbre(&self, program: u8, drums: DrumPolicy) -> Score {
        let mut score = self.clone();
        for track in &mut score.tracks {
            track.program = program;
            if drums == DrumPolicy::AsPitched {
                track.is_drum = false;
            }
        }
        score
    }
}
