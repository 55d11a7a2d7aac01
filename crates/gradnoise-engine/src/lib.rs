//! Graded-noise perturbation engine
//!
//! This crate turns a clean musical stimulus into a family of perturbed
//! renderings controlled by a single [`NoiseLevel`] in `[0, 1]`. Level 0 is the
//! unmodified (peak-normalized) original; level 1 is the most corrupted
//! variant each strategy produces.
//!
//! # Strategies
//!
//! - **Symbolic** - randomize note pitch, onset and duration, then synthesize
//! - **Spectral blend** - interpolate STFT magnitude and phase towards noise
//! - **Phase jitter** - add uniform phase noise, keep magnitudes
//! - **Frame jitter** - shift 10 ms frames in time and overlap-add
//! - **SNR noise** - add pink noise at an SNR between +40 and -20 dB
//!
//! # Determinism
//!
//! Every randomized operation takes an explicit `&mut Pcg32`. Given the same
//! input, level and stream, the output is bit-identical. Streams for separate
//! (input, level) pairs are derived from a run seed with BLAKE3; see [`rng`].
//!
//! # Example
//!
//! ```
//! use gradnoise_engine::{
//!     perturb_score, rng, NoiseLevel, Note, PianoSynth, PipelineOptions, Score, Strategy, Track,
//!     WavResult,
//! };
//!
//! let score = Score::new().with_track(Track::new(0).with_note(Note::new(60, 100, 0.0, 0.5)));
//! let mut stream = rng::create_stream_rng(42, "example", 50);
//!
//! let waveform = perturb_score(
//!     &score,
//!     Strategy::FrameJitter,
//!     NoiseLevel::from_percent(50)?,
//!     &PipelineOptions::default(),
//!     &PianoSynth::default(),
//!     &mut stream,
//! )?;
//! let wav = WavResult::from_waveform(&waveform);
//! assert_eq!(wav.num_samples, 22_050);
//! # Ok::<(), gradnoise_engine::EngineError>(())
//! ```

pub mod colored_noise;
pub mod error;
pub mod level;
pub mod normalize;
pub mod perturb;
pub mod randomize;
pub mod rng;
pub mod score;
pub mod snr;
pub mod spectral;
pub mod stft;
pub mod synth;
pub mod temporal;
pub mod wav;
pub mod waveform;

pub use error::{EngineError, EngineResult};
pub use level::NoiseLevel;
pub use normalize::{fit_to_duration, fit_to_length, peak_normalize};
pub use perturb::{perturb_score, perturb_waveform, PipelineOptions, Strategy};
pub use randomize::{randomize, Attributes, RandomizeOptions, TimingScale};
pub use score::{DrumPolicy, Note, PitchRange, Score, Track};
pub use snr::{inject_noise, measure_snr_db, snr_for_noise_level};
pub use spectral::{perturb_spectral, SpectralMode};
pub use synth::{PianoSynth, Synthesizer};
pub use temporal::perturb_temporal;
pub use wav::WavResult;
pub use waveform::{Waveform, SAMPLE_RATE};
