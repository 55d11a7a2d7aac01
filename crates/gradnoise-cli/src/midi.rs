//! Standard MIDI File loading.
//!
//! Parses `.mid` files with `midly` into an engine [`Score`]. Tick positions
//! are converted to seconds through a tempo map built from every `Tempo` meta
//! event in the file; SMPTE timecode files use a fixed tick length instead.
//! Notes are grouped into one [`Track`] per (file track, channel) pair.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gradnoise_engine::{EngineError, Note, Score, Track};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

/// Default tempo when a file has no tempo event (120 BPM).
const DEFAULT_MICROS_PER_BEAT: u32 = 500_000;

/// General MIDI percussion channel (channel 10, zero-based).
const DRUM_CHANNEL: u8 = 9;

/// Loads a MIDI file into a score.
///
/// Fails with [`EngineError::EmptyInput`] when the file holds no notes.
pub fn load_score(path: &Path) -> Result<Score> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read MIDI file: {}", path.display()))?;
    parse_score(&bytes).with_context(|| format!("Failed to load MIDI file: {}", path.display()))
}

/// Parses raw SMF bytes into a score.
pub fn parse_score(bytes: &[u8]) -> Result<Score> {
    let smf = Smf::parse(bytes).context("Invalid Standard MIDI File")?;
    let tempo_map = TempoMap::from_smf(&smf)?;

    let mut score = Score::new();
    let mut dangling = 0usize;

    for (track_index, events) in smf.tracks.iter().enumerate() {
        let mut builder = TrackBuilder::default();
        let mut tick = 0u64;

        for event in events {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    builder.name = Some(String::from_utf8_lossy(name).into_owned());
                }
                TrackEventKind::Midi { channel, message } => {
                    builder.handle(channel.as_int(), message, tick, &tempo_map);
                }
                _ => {}
            }
        }

        dangling += builder.open_notes();
        score.tracks.extend(builder.finish());
        tracing::trace!(track = track_index, ticks = tick, "parsed MIDI track");
    }

    if dangling > 0 {
        tracing::debug!(count = dangling, "dropped notes without a note-off");
    }

    if score.note_count() == 0 {
        return Err(EngineError::empty("MIDI file contains no notes").into());
    }

    Ok(score)
}

/// Tick to seconds conversion.
#[derive(Debug, Clone)]
enum TempoMap {
    /// Metrical timing: tempo segments sorted by tick.
    Metrical { segments: Vec<TempoSegment> },
    /// SMPTE timing: every tick has the same length.
    Timecode { seconds_per_tick: f64 },
}

#[derive(Debug, Clone, Copy)]
struct TempoSegment {
    tick: u64,
    seconds: f64,
    seconds_per_tick: f64,
}

impl TempoMap {
    fn from_smf(smf: &Smf) -> Result<Self, EngineError> {
        match smf.header.timing {
            Timing::Timecode(_, 0) => Err(EngineError::invalid_param(
                "timing",
                "SMPTE timing with zero subframes per frame",
            )),
            Timing::Timecode(fps, subframes) => Ok(TempoMap::Timecode {
                seconds_per_tick: 1.0 / (fps.as_f32() as f64 * subframes as f64),
            }),
            Timing::Metrical(ticks) => {
                let mut changes: Vec<(u64, u32)> = Vec::new();
                for events in &smf.tracks {
                    let mut tick = 0u64;
                    for event in events {
                        tick += event.delta.as_int() as u64;
                        if let TrackEventKind::Meta(MetaMessage::Tempo(micros)) = event.kind {
                            changes.push((tick, micros.as_int()));
                        }
                    }
                }
                // Stable sort keeps the last event at a shared tick last.
                changes.sort_by_key(|&(tick, _)| tick);
                Ok(Self::metrical(ticks.as_int().max(1) as f64, &changes))
            }
        }
    }

    fn metrical(ticks_per_beat: f64, changes: &[(u64, u32)]) -> Self {
        let spt = |micros: u32| micros as f64 / 1_000_000.0 / ticks_per_beat;

        let mut segments = vec![TempoSegment {
            tick: 0,
            seconds: 0.0,
            seconds_per_tick: spt(DEFAULT_MICROS_PER_BEAT),
        }];

        for &(tick, micros) in changes {
            let last = segments[segments.len() - 1];
            let segment = TempoSegment {
                tick,
                seconds: last.seconds + (tick - last.tick) as f64 * last.seconds_per_tick,
                seconds_per_tick: spt(micros),
            };
            if last.tick == tick {
                let end = segments.len() - 1;
                segments[end] = TempoSegment {
                    seconds: last.seconds,
                    ..segment
                };
            } else {
                segments.push(segment);
            }
        }

        TempoMap::Metrical { segments }
    }

    fn seconds(&self, tick: u64) -> f64 {
        match self {
            TempoMap::Timecode { seconds_per_tick } => tick as f64 * seconds_per_tick,
            TempoMap::Metrical { segments } => {
                let idx = segments.partition_point(|s| s.tick <= tick).saturating_sub(1);
                let segment = segments[idx];
                segment.seconds + (tick - segment.tick) as f64 * segment.seconds_per_tick
            }
        }
    }
}

/// Collects the notes of one file track, split by channel.
#[derive(Debug, Default)]
struct TrackBuilder {
    name: Option<String>,
    programs: HashMap<u8, u8>,
    channels: Vec<u8>,
    notes: HashMap<u8, Vec<Note>>,
    open: HashMap<(u8, u8), VecDeque<(f64, u8)>>,
}

impl TrackBuilder {
    fn handle(&mut self, channel: u8, message: MidiMessage, tick: u64, tempo: &TempoMap) {
        let time = tempo.seconds(tick);
        match message {
            MidiMessage::ProgramChange { program } => {
                self.programs.insert(channel, program.as_int());
            }
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                self.open
                    .entry((channel, key.as_int()))
                    .or_default()
                    .push_back((time, vel.as_int()));
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                let pitch = key.as_int();
                let started = self
                    .open
                    .get_mut(&(channel, pitch))
                    .and_then(VecDeque::pop_front);
                if let Some((onset, velocity)) = started {
                    if !self.channels.contains(&channel) {
                        self.channels.push(channel);
                    }
                    self.notes
                        .entry(channel)
                        .or_default()
                        .push(Note::new(pitch, velocity, onset, time));
                }
            }
            _ => {}
        }
    }

    fn open_notes(&self) -> usize {
        self.open.values().map(VecDeque::len).sum()
    }

    fn finish(mut self) -> Vec<Track> {
        let channels = std::mem::take(&mut self.channels);
        channels
            .into_iter()
            .filter_map(|channel| {
                let notes = self.notes.remove(&channel)?;
                Some(Track {
                    name: self.name.clone(),
                    program: self.programs.get(&channel).copied().unwrap_or(0),
                    is_drum: channel == DRUM_CHANNEL,
                    notes,
                })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Fps, Header, TrackEvent};

    fn ev(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind,
        }
    }

    fn on(channel: u8, key: u8, vel: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        }
    }

    fn off(channel: u8, key: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        }
    }

    fn end() -> TrackEventKind<'static> {
        TrackEventKind::Meta(MetaMessage::EndOfTrack)
    }

    fn encode(smf: &Smf) -> Vec<u8> {
        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    /// A format-1 file: tempo track plus one melody track of `pitches`,
    /// each a quarter note at 480 ticks per beat.
    pub(crate) fn melody_smf_bytes(pitches: &[u8], micros_per_beat: u32) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
        smf.tracks.push(vec![
            ev(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_beat)))),
            ev(0, end()),
        ]);

        let mut track = vec![ev(0, TrackEventKind::Meta(MetaMessage::TrackName(b"melody")))];
        for &pitch in pitches {
            track.push(ev(0, on(0, pitch, 100)));
            track.push(ev(480, off(0, pitch)));
        }
        track.push(ev(0, end()));
        smf.tracks.push(track);

        encode(&smf)
    }

    #[test]
    fn test_parse_metrical_melody() {
        let score = parse_score(&melody_smf_bytes(&[60, 62, 64], 500_000)).unwrap();

        assert_eq!(score.tracks.len(), 1);
        let track = &score.tracks[0];
        assert_eq!(track.name.as_deref(), Some("melody"));
        assert_eq!(track.notes.len(), 3);
        assert!(!track.is_drum);

        let note = track.notes[1];
        assert_eq!(note.pitch, 62);
        assert_eq!(note.velocity, 100);
        assert!((note.onset - 0.5).abs() < 1e-9);
        assert!((note.offset - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_mid_file() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(100))));
        smf.tracks.push(vec![
            ev(0, on(0, 60, 90)),
            ev(100, off(0, 60)),
            // From tick 100 on, one beat lasts 1 second.
            ev(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(1_000_000)))),
            ev(0, on(0, 64, 90)),
            ev(100, off(0, 64)),
            ev(0, end()),
        ]);

        let score = parse_score(&encode(&smf)).unwrap();
        let notes = &score.tracks[0].notes;
        assert!((notes[0].offset - 0.5).abs() < 1e-9);
        assert!((notes[1].onset - 0.5).abs() < 1e-9);
        assert!((notes[1].offset - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_smpte_timing() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Timecode(Fps::Fps25, 40)));
        smf.tracks.push(vec![ev(0, on(0, 70, 64)), ev(1000, off(0, 70)), ev(0, end())]);

        let score = parse_score(&encode(&smf)).unwrap();
        assert!((score.tracks[0].notes[0].offset - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_smpte_zero_subframes_is_rejected() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Timecode(Fps::Fps25, 0)));
        smf.tracks.push(vec![ev(0, on(0, 70, 64)), ev(1000, off(0, 70)), ev(0, end())]);

        let err = TempoMap::from_smf(&smf).unwrap_err();
        assert_eq!(err.code(), "ENGINE_001");
    }

    #[test]
    fn test_velocity_zero_is_note_off_and_drums_flagged() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
        smf.tracks.push(vec![
            ev(0, on(9, 36, 120)),
            ev(0, on(0, 48, 80)),
            ev(240, on(9, 36, 0)),
            ev(240, on(0, 48, 0)),
            ev(0, end()),
        ]);

        let score = parse_score(&encode(&smf)).unwrap();
        assert_eq!(score.tracks.len(), 2);
        let drums = score.tracks.iter().find(|t| t.is_drum).unwrap();
        assert_eq!(drums.notes[0].pitch, 36);
        assert!((drums.notes[0].offset - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_program_change_is_recorded() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
        smf.tracks.push(vec![
            ev(
                0,
                TrackEventKind::Midi {
                    channel: u4::new(2),
                    message: MidiMessage::ProgramChange {
                        program: u7::new(40),
                    },
                },
            ),
            ev(0, on(2, 67, 80)),
            ev(480, off(2, 67)),
            ev(0, end()),
        ]);

        let score = parse_score(&encode(&smf)).unwrap();
        assert_eq!(score.tracks[0].program, 40);
    }

    #[test]
    fn test_no_notes_is_empty_input() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
        smf.tracks.push(vec![ev(0, end())]);

        let err = parse_score(&encode(&smf)).unwrap_err();
        let engine = err.downcast_ref::<EngineError>().unwrap();
        assert_eq!(engine.code(), "ENGINE_002");
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_score(b"not a midi file").is_err());
    }
}
