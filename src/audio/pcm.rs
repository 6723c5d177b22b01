use anyhow::{bail, Result};

/// Convert f32 samples in [-1.0, 1.0] to 16-bit little-endian PCM bytes.
///
/// Each sample is scaled by 32768 and cast to i16. Rust's float-to-int cast
/// saturates, so out-of-range input clamps to i16::MIN/i16::MAX instead of
/// wrapping. Callers are still expected to pre-bound their samples.
pub fn encode(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * 32768.0) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert 16-bit little-endian PCM bytes back to f32 samples.
///
/// Fails if the byte length is odd (a truncated sample).
pub fn decode(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 2 != 0 {
        bail!("PCM16 payload has odd length: {} bytes", bytes.len());
    }

    let mut samples = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(value as f32 / 32768.0);
    }
    Ok(samples)
}
