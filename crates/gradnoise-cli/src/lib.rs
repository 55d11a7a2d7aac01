//! gradnoise CLI library.
//!
//! Input loading (MIDI and WAV), batch configuration, logging setup and the
//! `batch` and `perturb` commands of the `gradnoise` binary.

pub mod audio_input;
pub mod commands;
pub mod config;
pub mod logging;
pub mod midi;
pub mod stimulus;
