//! RIFF/WAVE serialization and PCM conversion.

use std::io::{self, Write};

use super::format::WavFormat;

/// Size of the canonical header written before the PCM payload.
pub(crate) const HEADER_LEN: usize = 44;

/// Writes a complete WAV file to `writer`.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    writer.write_all(&write_wav_to_vec(format, pcm_data))
}

/// Serializes a complete WAV file into a byte vector.
pub fn write_wav_to_vec(format: &WavFormat, pcm_data: &[u8]) -> Vec<u8> {
    let data_size = pcm_data.len() as u32;
    // RIFF size excludes the 8-byte RIFF chunk header.
    let file_size = 36 + data_size;

    let mut buffer = Vec::with_capacity(HEADER_LEN + pcm_data.len());

    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&file_size.to_le_bytes());
    buffer.extend_from_slice(b"WAVE");

    buffer.extend_from_slice(b"fmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes());
    buffer.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buffer.extend_from_slice(&format.channels.to_le_bytes());
    buffer.extend_from_slice(&format.sample_rate.to_le_bytes());
    buffer.extend_from_slice(&format.byte_rate().to_le_bytes());
    buffer.extend_from_slice(&format.block_align().to_le_bytes());
    buffer.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&data_size.to_le_bytes());
    buffer.extend_from_slice(pcm_data);

    buffer
}

/// Converts samples to little-endian 16-bit PCM.
///
/// Samples are clamped to [-1.0, 1.0]; NaN maps to 0.
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);

    for &sample in samples {
        let clamped = if sample.is_nan() {
            0.0
        } else {
            sample.clamp(-1.0, 1.0)
        };
        let value = (clamped * 32767.0).round() as i16;
        pcm.extend_from_slice(&value.to_le_bytes());
    }

    pcm
}
