//! WAV encoding - assembles the RIFF, fmt and data chunks from a finished
//! stream.

use crate::error::StreamError;

use super::sample::Sample;

/// Flatten a stream into raw channel-interleaved little-endian PCM bytes.
pub fn samples_to_bytes(stream: &[Sample]) -> Vec<u8> {
    let frame = stream.first().map_or(0, |s| s.bytes().len());
    let mut data = Vec::with_capacity(stream.len() * frame);
    for sample in stream {
        data.extend_from_slice(sample.bytes());
    }
    data
}

/// Encode a finished single-format stream as a complete WAV byte buffer.
///
/// Chunk layout is the canonical 44-byte header: RIFF chunk, 16-byte PCM fmt
/// chunk, data chunk. Every multi-byte field is written little-endian
/// regardless of host order. An empty stream is a precondition violation.
pub fn encode_wav(stream: &[Sample]) -> Result<Vec<u8>, StreamError> {
    if stream.is_empty() {
        return Err(StreamError::Empty { op: "encode_wav" });
    }
    let format = *stream[0].format();
    let data = samples_to_bytes(stream);

    let fmt_size: u32 = 16;
    let data_size = data.len() as u32;
    let riff_size = 4 + (8 + fmt_size) + (8 + data_size);
    let byte_rate =
        format.sample_rate * format.channel_count as u32 * format.bytes_per_sample as u32;
    let block_align = format.channel_count * format.bytes_per_sample;

    let mut buf = Vec::with_capacity(44 + data.len());

    // RIFF chunk
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&riff_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&fmt_size.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    buf.extend_from_slice(&format.channel_count.to_le_bytes());
    buf.extend_from_slice(&format.sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    buf.extend_from_slice(&data);

    Ok(buf)
}
