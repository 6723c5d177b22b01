// Tests for fixed-size capture framing.

use velmo_live::audio::pcm;
use velmo_live::CaptureEncoder;

#[test]
fn test_frames_emitted_at_fixed_size() {
    let mut encoder = CaptureEncoder::new(4);

    assert!(encoder.push(&[0.1, 0.2, 0.3]).is_empty());
    assert_eq!(encoder.pending_samples(), 3);

    let frames = encoder.push(&[0.4, 0.5]);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0], pcm::encode(&[0.1, 0.2, 0.3, 0.4]));
    assert_eq!(encoder.pending_samples(), 1);
}

#[test]
fn test_single_push_spanning_multiple_frames() {
    let mut encoder = CaptureEncoder::new(2);
    let samples = [0.1f32, 0.2, 0.3, 0.4, 0.5];

    let frames = encoder.push(&samples);
    assert_eq!(frames.len(), 2, "Two complete frames, one sample left over");
    assert_eq!(frames[0], pcm::encode(&samples[0..2]));
    assert_eq!(frames[1], pcm::encode(&samples[2..4]));
    assert_eq!(encoder.pending_samples(), 1);
}

#[test]
fn test_flush_emits_partial_remainder() {
    let mut encoder = CaptureEncoder::new(4);
    encoder.push(&[0.1, 0.2, 0.3]);

    let frame = encoder.flush().expect("Remainder frame expected");
    assert_eq!(frame, pcm::encode(&[0.1, 0.2, 0.3]));
    assert_eq!(encoder.pending_samples(), 0);

    assert!(encoder.flush().is_none(), "Nothing left after flush");
}

#[test]
fn test_flush_with_no_pending_samples() {
    let mut encoder = CaptureEncoder::new(4);
    assert!(encoder.flush().is_none());
}

#[test]
fn test_exact_boundary_leaves_nothing_pending() {
    let mut encoder = CaptureEncoder::new(3);
    let frames = encoder.push(&[0.1, 0.2, 0.3]);
    assert_eq!(frames.len(), 1);
    assert_eq!(encoder.pending_samples(), 0);
    assert!(encoder.flush().is_none());
}
