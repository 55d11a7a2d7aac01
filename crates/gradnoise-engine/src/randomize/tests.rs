//! Tests for symbolic randomization.

use super::*;
use crate::rng::create_rng;
use crate::score::{Note, PIANO_MAX_PITCH, PIANO_MIN_PITCH};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn level(value: f64) -> NoiseLevel {
    NoiseLevel::new(value).unwrap()
}

fn melody(pitches: &[u8]) -> Score {
    let track = pitches.iter().enumerate().fold(Track::new(0), |t, (i, &p)| {
        let onset = i as f64 * 0.5;
        t.with_note(Note::new(p, 96, onset, onset + 0.45))
    });
    Score::new().with_track(track)
}

#[test]
fn test_zero_level_is_identity_and_consumes_nothing() {
    let score = melody(&[60, 62, 64, 65, 67]);
    let mut rng = create_rng(7);
    let mut untouched = create_rng(7);

    let out = randomize(&score, NoiseLevel::ZERO, &RandomizeOptions::default(), &mut rng).unwrap();

    assert_eq!(out, score);
    assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
}

#[test]
fn test_input_score_is_not_mutated() {
    let score = melody(&[60, 62, 64, 65, 67, 69, 71, 72]);
    let before = score.clone();
    let mut rng = create_rng(42);

    let out = randomize(&score, NoiseLevel::FULL, &RandomizeOptions::default(), &mut rng).unwrap();

    assert_eq!(score, before);
    assert_ne!(out, score);
}

#[test]
fn test_determinism() {
    let score = melody(&[55, 57, 60, 64, 67, 70]);
    let options = RandomizeOptions::unconstrained();

    let a = randomize(&score, level(0.5), &options, &mut create_rng(3)).unwrap();
    let b = randomize(&score, level(0.5), &options, &mut create_rng(3)).unwrap();
    let c = randomize(&score, level(0.5), &options, &mut create_rng(4)).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_empty_track_is_skipped() {
    let score = Score::new()
        .with_track(Track::new(0))
        .with_track(melody(&[60, 64]).tracks.remove(0));
    let out = randomize(&score, NoiseLevel::FULL, &RandomizeOptions::default(), &mut create_rng(1))
        .unwrap();

    assert!(out.tracks[0].notes.is_empty());
    assert_eq!(out.tracks[1].notes.len(), 2);
}

#[test]
fn test_flagged_drum_track_is_skipped() {
    let mut drums = melody(&[36, 38, 42, 46]).tracks.remove(0);
    drums.is_drum = true;
    let score = Score::new().with_track(drums);

    let options = RandomizeOptions::unconstrained();
    let out = randomize(&score, NoiseLevel::FULL, &options, &mut create_rng(5)).unwrap();

    assert_eq!(out, score);
}

#[test]
fn test_preserve_range_scenario() {
    // One track, 10 notes, pitches spread 60 ± 5.
    let pitches = [55, 56, 58, 59, 60, 60, 61, 62, 64, 65];
    let score = melody(&pitches);
    let lo = pitches.iter().min().unwrap().saturating_sub(12).max(21);
    let hi = (pitches.iter().max().unwrap() + 12).min(108);

    for seed in 0..50 {
        let out = randomize(
            &score,
            NoiseLevel::FULL,
            &RandomizeOptions::preserving(),
            &mut create_rng(seed),
        )
        .unwrap();

        for note in &out.tracks[0].notes {
            assert!(
                (lo..=hi).contains(&note.pitch),
                "seed {} produced pitch {} outside [{}, {}]",
                seed,
                note.pitch,
                lo,
                hi
            );
        }
    }
}

#[test]
fn test_preserve_range_with_off_piano_pitches() {
    for (pitches, lo, hi) in [([5u8, 6, 8], 21u8, 33u8), ([121, 125, 127], 96, 108)] {
        let score = melody(&pitches);
        let out = randomize(
            &score,
            NoiseLevel::FULL,
            &RandomizeOptions::preserving(),
            &mut create_rng(17),
        )
        .unwrap();

        // Full level selects every note, so every pitch is redrawn and clamped.
        for note in &out.tracks[0].notes {
            assert!((lo..=hi).contains(&note.pitch), "pitch {}", note.pitch);
        }
    }
}

#[test]
fn test_short_notes_get_duration_floor() {
    let track = Track::new(0)
        .with_note(Note::new(60, 90, 0.0, 0.05))
        .with_note(Note::new(62, 90, 1.0, 1.05))
        .with_note(Note::new(64, 90, 2.0, 2.0));
    let score = Score::new().with_track(track);

    let out = randomize(&score, level(0.34), &RandomizeOptions::default(), &mut create_rng(3))
        .unwrap();

    for note in &out.tracks[0].notes {
        assert!(note.duration() >= MIN_NOTE_DURATION - 1e-9, "{:?}", note);
    }
}

#[test]
fn test_unconstrained_pitches_stay_on_piano() {
    let score = melody(&[60; 40]);
    let out = randomize(
        &score,
        NoiseLevel::FULL,
        &RandomizeOptions::unconstrained(),
        &mut create_rng(11),
    )
    .unwrap();

    let notes = &out.tracks[0].notes;
    assert!(notes
        .iter()
        .all(|n| (PIANO_MIN_PITCH..=PIANO_MAX_PITCH).contains(&n.pitch)));
    // With 40 uniform draws over 88 keys, some pitch must move.
    assert!(notes.iter().any(|n| n.pitch != 60));
}

#[test]
fn test_constant_pitch_track_keeps_pitch_when_preserving() {
    // Zero spread means the normal draw collapses onto the original pitch.
    let score = melody(&[64; 12]);
    let options = RandomizeOptions::preserving().with_attributes(Attributes::PITCH_ONLY);
    let out = randomize(&score, NoiseLevel::FULL, &options, &mut create_rng(5)).unwrap();

    assert!(out.tracks[0].notes.iter().all(|n| n.pitch == 64));
}

#[test]
fn test_pitch_only_leaves_timing() {
    let score = melody(&[48, 52, 55, 60, 64, 67, 72]);
    let options = RandomizeOptions::unconstrained().with_attributes(Attributes::PITCH_ONLY);
    let out = randomize(&score, NoiseLevel::FULL, &options, &mut create_rng(9)).unwrap();

    for (orig, new) in score.tracks[0].notes.iter().zip(&out.tracks[0].notes) {
        assert_eq!(orig.onset, new.onset);
        assert_eq!(orig.offset, new.offset);
    }
}

#[test]
fn test_onset_shift_keeps_duration() {
    let score = melody(&[60, 62, 64, 65, 67, 69]);
    let options = RandomizeOptions::preserving().with_attributes(Attributes {
        pitch: false,
        onset: true,
        duration: false,
    });
    let out = randomize(&score, level(0.8), &options, &mut create_rng(21)).unwrap();

    for (orig, new) in score.tracks[0].notes.iter().zip(&out.tracks[0].notes) {
        assert!((orig.duration() - new.duration()).abs() < 1e-9 || new.onset == 0.0);
        assert!((new.onset - orig.onset).abs() <= 0.4 + 1e-9);
    }
}

#[test]
fn test_scaled_window_is_narrower_than_fixed() {
    let score = melody(&[60; 64]);
    let timing_only = Attributes {
        pitch: false,
        onset: true,
        duration: false,
    };

    let scaled = randomize(
        &score,
        level(0.1),
        &RandomizeOptions::preserving().with_attributes(timing_only),
        &mut create_rng(2),
    )
    .unwrap();
    let fixed = randomize(
        &score,
        level(0.1),
        &RandomizeOptions::fixed_window().with_attributes(timing_only),
        &mut create_rng(2),
    )
    .unwrap();

    let max_shift = |out: &Score| {
        out.tracks[0]
            .notes
            .iter()
            .zip(&score.tracks[0].notes)
            .map(|(n, o)| (n.onset - o.onset).abs())
            .fold(0.0, f64::max)
    };
    assert!(max_shift(&scaled) <= 0.05 + 1e-9);
    assert!(max_shift(&fixed) > 0.05);
}

#[test]
fn test_shifts_stay_within_closed_window() {
    let track = (0..200).fold(Track::new(0), |t, _| t.with_note(Note::new(60, 90, 10.0, 10.5)));
    let score = Score::new().with_track(track);
    let options = RandomizeOptions::fixed_window().with_attributes(Attributes {
        pitch: false,
        onset: true,
        duration: false,
    });

    let out = randomize(&score, NoiseLevel::FULL, &options, &mut create_rng(77)).unwrap();

    let shifts: Vec<f64> = out.tracks[0].notes.iter().map(|n| n.onset - 10.0).collect();
    assert!(shifts.iter().all(|s| s.abs() <= MAX_TIME_CHANGE + 1e-9));
    assert!(shifts.iter().any(|&s| s < -0.25));
    assert!(shifts.iter().any(|&s| s > 0.25));
}

#[test]
fn test_selection_size_rounds() {
    // 0.25 * 6 = 1.5 rounds to 2 notes per attribute.
    let score = melody(&[60, 60, 60, 60, 60, 60]);
    let options = RandomizeOptions::unconstrained().with_attributes(Attributes::PITCH_ONLY);
    let mut rng = create_rng(1234);
    let out = randomize(&score, level(0.25), &options, &mut rng).unwrap();

    let changed = out.tracks[0].notes.iter().filter(|n| n.pitch != 60).count();
    assert!(changed <= 2);
}

fn arbitrary_score() -> impl Strategy<Value = Score> {
    prop::collection::vec(
        prop::collection::vec((0u8..=127, 0.0f64..30.0, 0.0f64..4.0), 0..40),
        1..4,
    )
    .prop_map(|tracks| {
        tracks.into_iter().fold(Score::new(), |score, notes| {
            let track = notes.into_iter().fold(Track::new(0), |t, (p, on, dur)| {
                t.with_note(Note::new(p, 100, on, on + dur))
            });
            score.with_track(track)
        })
    })
}

proptest! {
    #[test]
    fn timing_invariants_hold(
        score in arbitrary_score(),
        value in 0.0f64..=1.0,
        seed in any::<u32>(),
        preserve in any::<bool>(),
        fixed in any::<bool>(),
    ) {
        let options = RandomizeOptions {
            preserve_range: preserve,
            timing: if fixed { TimingScale::Fixed } else { TimingScale::Scaled },
            attributes: Attributes::ALL,
        };
        let out = randomize(&score, level(value), &options, &mut create_rng(seed)).unwrap();

        prop_assert_eq!(out.tracks.len(), score.tracks.len());
        for (orig, new) in score.tracks.iter().zip(&out.tracks) {
            prop_assert_eq!(orig.notes.len(), new.notes.len());
            let range = orig.pitch_range(12);
            for (before, note) in orig.notes.iter().zip(&new.notes) {
                prop_assert!(note.onset >= 0.0);
                if value > 0.0 {
                    prop_assert!(note.duration() >= MIN_NOTE_DURATION - 1e-9);
                }
                if note.pitch != before.pitch {
                    prop_assert!(note.pitch >= PIANO_MIN_PITCH && note.pitch <= PIANO_MAX_PITCH);
                    if preserve {
                        prop_assert!(range.contains(note.pitch));
                    }
                }
            }
        }
    }
}
