//! Deterministic 16-bit PCM mono WAV output.
//!
//! Files carry no timestamps or variable metadata, so identical samples
//! always produce identical bytes. The BLAKE3 hash of the PCM payload is
//! reported per output for reproducibility checks.

mod format;
mod pcm;
mod result;
mod writer;


pub use format::WavFormat;
pub use pcm::{compute_pcm_hash, extract_pcm_data, pcm_hash};
pub use result::WavResult;
pub use writer::{samples_to_pcm16, write_wav, write_wav_to_vec};
