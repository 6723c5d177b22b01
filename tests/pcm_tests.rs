// Tests for the f32 <-> PCM16 conversion layer.

use anyhow::Result;
use velmo_live::audio::pcm;

#[test]
fn test_decode_then_encode_is_identity() -> Result<()> {
    // Any byte-aligned PCM16 buffer must survive a decode/encode round trip.
    let mut bytes = Vec::new();
    for value in [-32768i16, -12345, -1, 0, 1, 255, 12345, 32767] {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    let samples = pcm::decode(&bytes)?;
    assert_eq!(samples.len(), bytes.len() / 2);

    let round_trip = pcm::encode(&samples);
    assert_eq!(round_trip, bytes, "Round trip must be byte-exact");

    Ok(())
}

#[test]
fn test_decode_known_values() -> Result<()> {
    let bytes = [0x00, 0x80, 0x00, 0x00, 0xFF, 0x7F];
    let samples = pcm::decode(&bytes)?;

    assert_eq!(samples[0], -1.0, "i16::MIN maps to -1.0");
    assert_eq!(samples[1], 0.0);
    assert!(
        (samples[2] - 32767.0 / 32768.0).abs() < f32::EPSILON,
        "i16::MAX maps to just below 1.0"
    );

    Ok(())
}

#[test]
fn test_decode_rejects_odd_length() {
    let result = pcm::decode(&[0x01, 0x02, 0x03]);
    assert!(result.is_err(), "Odd byte length is malformed input");
}

#[test]
fn test_decode_empty() -> Result<()> {
    assert!(pcm::decode(&[])?.is_empty());
    Ok(())
}

#[test]
fn test_encode_scales_and_truncates() {
    let bytes = pcm::encode(&[0.0, 0.5, -1.0]);
    assert_eq!(bytes.len(), 6, "Two bytes per sample");

    assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), 0);
    assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), 16384);
    assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), -32768);
}

#[test]
fn test_encode_clamps_out_of_range() {
    // Out-of-range samples clamp rather than wrap (see DESIGN.md).
    let bytes = pcm::encode(&[1.5, -2.0]);
    assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
    assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), i16::MIN);
}
